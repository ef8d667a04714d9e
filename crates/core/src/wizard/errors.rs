//! Wizard error types

use assessor_domain::{AssessorError, WizardSection};
use thiserror::Error;

use super::submission::SubmissionError;

/// Why a draft cannot be submitted yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftValidationKind {
    MissingName,
    MissingTemplate,
    MissingDictionary,
    InvalidPlaceholders,
}

/// Validation failure; never involves a request.
///
/// `section` is the section the wizard shows after the failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", self.message())]
pub struct DraftValidationError {
    pub section: WizardSection,
    pub kind: DraftValidationKind,
}

impl DraftValidationError {
    pub fn message(&self) -> &'static str {
        match self.kind {
            DraftValidationKind::MissingName => "Please enter a project name",
            DraftValidationKind::MissingTemplate => "Please upload a report template",
            DraftValidationKind::MissingDictionary => "Please select a dictionary",
            DraftValidationKind::InvalidPlaceholders => {
                "The template contains invalid placeholders"
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] DraftValidationError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// The template could not be analyzed before the placeholder check.
    #[error("template analysis failed: {0}")]
    Analysis(AssessorError),

    #[error("project has already been submitted")]
    AlreadySubmitted,
}

//! Ordered submission pipeline
//!
//! create project → upload template → upload each knowledge-base file →
//! initialize context (only when knowledge-base files were uploaded).
//! Every step is awaited before the next one starts. A failure stops the
//! pipeline; steps that already succeeded are not rolled back.

use std::fmt;

use assessor_domain::constants::GENERIC_SUBMISSION_ERROR;
use assessor_domain::{AssessorError, CreateProjectRequest, DraftFile};
use thiserror::Error;
use tracing::{info, warn};

use super::ports::{ProjectSetupApi, UploadKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStage {
    CreateProject,
    UploadTemplate,
    UploadKnowledgeBase { index: usize, file_name: String },
    InitializeContext,
}

impl fmt::Display for SubmissionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateProject => f.write_str("create project"),
            Self::UploadTemplate => f.write_str("upload template"),
            Self::UploadKnowledgeBase { file_name, .. } => {
                write!(f, "upload knowledge base file {file_name}")
            }
            Self::InitializeContext => f.write_str("initialize context"),
        }
    }
}

/// A submission that stopped part-way
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SubmissionError {
    /// Step that failed
    pub stage: SubmissionStage,
    /// Steps that succeeded before the failure
    pub completed: Vec<SubmissionStage>,
    /// Set once the project record exists on the server
    pub project_id: Option<String>,
    /// Server message, or a generic fallback
    pub message: String,
    pub source: AssessorError,
}

impl SubmissionError {
    /// Whether a project record was left behind on the server.
    pub fn is_partial(&self) -> bool {
        self.project_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub project_id: String,
    pub uploaded_files: usize,
    pub context_initialized: bool,
}

#[derive(Default)]
struct Progress {
    completed: Vec<SubmissionStage>,
    project_id: Option<String>,
}

impl Progress {
    fn fail(self, stage: SubmissionStage, source: AssessorError) -> SubmissionError {
        let message = match &source {
            AssessorError::Server(m)
            | AssessorError::NotFound(m)
            | AssessorError::Validation(m)
            | AssessorError::InvalidInput(m)
                if !m.trim().is_empty() =>
            {
                m.trim().to_string()
            }
            _ => GENERIC_SUBMISSION_ERROR.to_string(),
        };
        warn!(
            stage = %stage,
            project_id = ?self.project_id,
            completed = self.completed.len(),
            error = %source,
            "project submission aborted"
        );
        SubmissionError {
            stage,
            completed: self.completed,
            project_id: self.project_id,
            message,
            source,
        }
    }
}

pub(super) async fn run(
    api: &dyn ProjectSetupApi,
    request: &CreateProjectRequest,
    template: &DraftFile,
    knowledge_base: &[DraftFile],
) -> Result<SubmissionReceipt, SubmissionError> {
    let mut progress = Progress::default();

    let project_id = match api.create_project(request).await {
        Ok(created) => created.id,
        Err(err) => return Err(progress.fail(SubmissionStage::CreateProject, err)),
    };
    info!(project_id = %project_id, "project record created");
    progress.project_id = Some(project_id.clone());
    progress.completed.push(SubmissionStage::CreateProject);

    let uploaded = api.upload_project_file(&project_id, template, UploadKind::Template).await;
    if let Err(err) = uploaded {
        return Err(progress.fail(SubmissionStage::UploadTemplate, err));
    }
    progress.completed.push(SubmissionStage::UploadTemplate);

    for (index, file) in knowledge_base.iter().enumerate() {
        let stage = SubmissionStage::UploadKnowledgeBase { index, file_name: file.file_name.clone() };
        let uploaded = api.upload_project_file(&project_id, file, UploadKind::KnowledgeBase).await;
        if let Err(err) = uploaded {
            return Err(progress.fail(stage, err));
        }
        progress.completed.push(stage);
    }

    let context_initialized = !knowledge_base.is_empty();
    if context_initialized {
        if let Err(err) = api.initialize_context(&project_id).await {
            return Err(progress.fail(SubmissionStage::InitializeContext, err));
        }
        progress.completed.push(SubmissionStage::InitializeContext);
    }

    let uploaded_files = knowledge_base.len() + 1;
    info!(project_id = %project_id, uploaded_files, "project submission complete");
    Ok(SubmissionReceipt { project_id, uploaded_files, context_initialized })
}

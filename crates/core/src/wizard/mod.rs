//! Project creation wizard: draft editing, validation and submission

mod errors;
pub mod ports;
mod submission;
mod draft;

pub use errors::{DraftValidationError, DraftValidationKind, WizardError};
pub use submission::{SubmissionError, SubmissionReceipt, SubmissionStage};
pub use draft::{DraftWizard, WizardCatalog};

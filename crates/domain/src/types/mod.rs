//! Domain types and models

pub mod draft;
pub mod listing;
pub mod live;
pub mod reference;
pub mod routes;
pub mod session;

mod serde_helpers;

pub use draft::{
    CreateProjectRequest, CreatedProject, DraftFile, PromptSet, ProjectDraft, TemplateAnalysis,
    TemplateAnalysisReport, WizardSection,
};
pub use listing::{ListRow, ListTab, ProjectSummary, ReportSummary, SortKey, SortValue};
pub use live::{LiveDelivery, LiveEvent, LiveEventKind, LiveEventPayload};
pub use reference::{AvailableUser, DictionaryContent, DictionaryOption, SimulationFile};
pub use routes::RouteId;
pub use session::{Credential, CredentialClaims, CredentialError, Role, Session};

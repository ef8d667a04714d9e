//! # Assessor Core
//!
//! Client-side view/session state machines - no infrastructure dependencies.
//!
//! This crate contains:
//! - Session store and authentication service
//! - Router, route guard and navigation blocker
//! - Live-update reconciliation
//! - Global stores (toasts, refresh signal, project cache)
//! - Project draft wizard and submission pipeline
//! - Dashboard list views and search debouncing
//!
//! ## Architecture Principles
//! - Only depends on `assessor-domain`
//! - No HTTP, socket or filesystem code
//! - All external collaborators via port traits
//! - Stores are injectable values, never process globals

pub mod listing;
pub mod live;
pub mod navigation;
pub mod session;
pub mod stores;
pub mod wizard;

// Re-export specific items to avoid ambiguity
pub use listing::ports::ListBackend;
pub use listing::{ArchiveOp, ArchiveTarget, ListView, SearchDebouncer, SortDirection};
pub use live::{LiveEventDispatcher, LiveUpdateReconciler, ReconcileOutcome};
pub use navigation::ports::Navigator;
pub use navigation::{
    requires_confirmation, DraftStatus, HistoryNavigator, Resolution, RouteMatch, Router,
};
pub use session::ports::{AuthApi, CredentialRejectionHandler, CredentialStore};
pub use session::{AuthService, MemoryCredentialStore, SessionInvalidator, SessionStore};
pub use stores::{ProjectCache, RefreshSignal, Toast, ToastId, ToastQueue, ToastSeverity};
pub use wizard::ports::{ProjectSetupApi, UploadKind};
pub use wizard::{
    DraftValidationError, DraftValidationKind, DraftWizard, SubmissionError, SubmissionReceipt,
    SubmissionStage, WizardCatalog, WizardError,
};

//! Dashboard list views (projects, reports)

mod debounce;
pub mod ports;
mod view;

pub use debounce::SearchDebouncer;
pub use view::{ArchiveOp, ArchiveTarget, ListView, SortDirection};

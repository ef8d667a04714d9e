//! Routing, route guard and navigation blocking

mod blocker;
mod history;
pub mod ports;
mod router;

pub use blocker::{requires_confirmation, DraftStatus};
pub use history::HistoryNavigator;
pub use router::{Resolution, RouteAccess, RouteDefinition, RouteMatch, Router};

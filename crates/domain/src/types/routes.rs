//! Named client routes

use serde::{Deserialize, Serialize};

/// Every page the client can render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteId {
    Login,
    ForgotPassword,
    Projects,
    ProjectCreate,
    ProjectDetail,
    /// Report detail, reachable nested under its project or standalone.
    ReportDetail,
    AdminUsers,
}

impl RouteId {
    /// Routes reachable without a session.
    pub fn is_public(self) -> bool {
        matches!(self, Self::Login | Self::ForgotPassword)
    }
}

//! Unsaved-draft navigation blocking

use assessor_domain::RouteId;

use super::router::Router;

/// What the blocker needs to know about the wizard draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DraftStatus {
    pub dirty: bool,
    pub submitted: bool,
}

/// Whether leaving `from` for `to` must be confirmed by the user.
///
/// Only same-origin navigations away from the project wizard with a dirty,
/// unsubmitted draft are blocked. Absolute URLs are treated as leaving the
/// origin and never blocked here.
pub fn requires_confirmation(router: &Router, from: &str, to: &str, draft: DraftStatus) -> bool {
    if !draft.dirty || draft.submitted {
        return false;
    }
    if to.contains("://") || to.starts_with("//") {
        return false;
    }

    let on_wizard = router.match_path(from).is_some_and(|m| m.id == RouteId::ProjectCreate);
    on_wizard && normalize(from) != normalize(to)
}

fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end].trim_end_matches('/')
}

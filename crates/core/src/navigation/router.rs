//! Route table with specificity-ordered matching and the auth guard
//!
//! Patterns are compiled once and sorted by specificity, so a literal
//! segment such as `/projects/new` always beats a dynamic sibling like
//! `/projects/:projectId`, whatever order the table was declared in.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use assessor_domain::constants::{FORGOT_PASSWORD_PATH, LANDING_PATH, LOGIN_PATH};
use assessor_domain::{Role, RouteId, Session};
use tracing::debug;

/// Who may render a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    Authenticated,
    Roles(&'static [Role]),
}

/// One entry of the route table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDefinition {
    pub id: RouteId,
    pub pattern: &'static str,
    pub access: RouteAccess,
}

impl RouteDefinition {
    pub const fn new(id: RouteId, pattern: &'static str, access: RouteAccess) -> Self {
        Self { id, pattern, access }
    }
}

const PROJECT_CREATORS: &[Role] = &[Role::ProjectManager, Role::Admin];
const ADMINS: &[Role] = &[Role::Admin];

/// The client's route table
pub const STANDARD_ROUTES: &[RouteDefinition] = &[
    RouteDefinition::new(RouteId::Login, LOGIN_PATH, RouteAccess::Public),
    RouteDefinition::new(RouteId::ForgotPassword, FORGOT_PASSWORD_PATH, RouteAccess::Public),
    RouteDefinition::new(RouteId::Projects, LANDING_PATH, RouteAccess::Authenticated),
    RouteDefinition::new(RouteId::ProjectDetail, "/projects/:projectId", RouteAccess::Authenticated),
    RouteDefinition::new(RouteId::ProjectCreate, "/projects/new", RouteAccess::Roles(PROJECT_CREATORS)),
    RouteDefinition::new(
        RouteId::ReportDetail,
        "/projects/:projectId/reports/:reportId",
        RouteAccess::Authenticated,
    ),
    RouteDefinition::new(RouteId::ReportDetail, "/reports/:reportId", RouteAccess::Authenticated),
    RouteDefinition::new(RouteId::AdminUsers, "/admin/users", RouteAccess::Roles(ADMINS)),
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    definition: RouteDefinition,
    segments: Vec<Segment>,
}

impl CompiledRoute {
    fn compile(definition: RouteDefinition) -> Self {
        let segments = split_path(definition.pattern)
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Static(segment.to_string()),
            })
            .collect();
        Self { definition, segments }
    }

    fn static_count(&self) -> usize {
        self.segments.iter().filter(|s| matches!(s, Segment::Static(_))).count()
    }

    fn param_count(&self) -> usize {
        self.segments.len() - self.static_count()
    }

    /// More static segments first, then fewer parameters, then longer
    /// patterns; the pattern text breaks remaining ties.
    fn specificity_cmp(&self, other: &Self) -> Ordering {
        other
            .static_count()
            .cmp(&self.static_count())
            .then_with(|| self.param_count().cmp(&other.param_count()))
            .then_with(|| other.segments.len().cmp(&self.segments.len()))
            .then_with(|| self.definition.pattern.cmp(other.definition.pattern))
    }

    fn matches(&self, parts: &[&str]) -> Option<BTreeMap<String, String>> {
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Static(expected) if expected == part => {}
                Segment::Static(_) => return None,
                Segment::Param(name) => {
                    let value = urlencoding::decode(part)
                        .map(|decoded| decoded.into_owned())
                        .unwrap_or_else(|_| (*part).to_string());
                    params.insert(name.clone(), value);
                }
            }
        }
        Some(params)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Strip query string and fragment
fn path_only(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

/// A route matched against a concrete path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub id: RouteId,
    pub pattern: &'static str,
    pub access: RouteAccess,
    pub params: BTreeMap<String, String>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Whether this match is the detail view of report `report_id`
    pub fn is_report_detail(&self, report_id: &str) -> bool {
        self.id == RouteId::ReportDetail && self.param("reportId") == Some(report_id)
    }
}

/// Outcome of guarding a navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Render(RouteMatch),
    Redirect(String),
}

/// Specificity-ordered route matcher
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<CompiledRoute>,
}

impl Default for Router {
    fn default() -> Self {
        Self::standard()
    }
}

impl Router {
    /// Compile a table; declaration order is irrelevant.
    pub fn new(definitions: &[RouteDefinition]) -> Self {
        let mut routes: Vec<CompiledRoute> =
            definitions.iter().copied().map(CompiledRoute::compile).collect();
        routes.sort_by(CompiledRoute::specificity_cmp);
        Self { routes }
    }

    pub fn standard() -> Self {
        Self::new(STANDARD_ROUTES)
    }

    /// Match a concrete path, ignoring query, fragment and trailing slashes.
    pub fn match_path(&self, path: &str) -> Option<RouteMatch> {
        let parts: Vec<&str> = split_path(path_only(path)).collect();
        self.routes.iter().find_map(|route| {
            route.matches(&parts).map(|params| RouteMatch {
                id: route.definition.id,
                pattern: route.definition.pattern,
                access: route.definition.access,
                params,
            })
        })
    }

    /// Apply the auth guard to a navigation.
    ///
    /// - no session on a non-public route: login
    /// - a session on the login route: landing
    /// - a role the route does not admit: landing
    /// - unmatched paths: landing or login depending on the session
    pub fn resolve(&self, path: &str, session: Option<&Session>) -> Resolution {
        let fallback = if session.is_some() { LANDING_PATH } else { LOGIN_PATH };

        let Some(matched) = self.match_path(path) else {
            debug!(path, redirect = fallback, "unmatched path");
            return Resolution::Redirect(fallback.to_string());
        };

        match (matched.access, session) {
            (RouteAccess::Public, Some(_)) if matched.id == RouteId::Login => {
                Resolution::Redirect(LANDING_PATH.to_string())
            }
            (RouteAccess::Public, _) => Resolution::Render(matched),
            (_, None) => Resolution::Redirect(LOGIN_PATH.to_string()),
            (RouteAccess::Roles(roles), Some(session)) if !roles.contains(&session.role) => {
                debug!(path, role = ?session.role, "role not admitted");
                Resolution::Redirect(LANDING_PATH.to_string())
            }
            (_, Some(_)) => Resolution::Render(matched),
        }
    }
}

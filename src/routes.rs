use crate::identity::{Identity, Role};
use crate::policy::{self, Requirement, Verdict};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RouteEntry {
    pub path: &'static str,
    pub requirement: Requirement,
}

const fn route(path: &'static str, requirement: Requirement) -> RouteEntry {
    RouteEntry { path, requirement }
}

/// The full navigable surface. Anything not listed redirects to the login page.
pub static ROUTES: &[RouteEntry] = &[
    route("/login", Requirement::Public),
    route("/signup", Requirement::Public),
    route("/dashboard", Requirement::Authenticated),
    route("/subjects", Requirement::Authenticated),
    route("/attendance", Requirement::Role(Role::Student)),
    route("/grades", Requirement::Role(Role::Student)),
    route("/attendance-management", Requirement::Role(Role::Teacher)),
    route("/grade-management", Requirement::Role(Role::Teacher)),
    route("/students", Requirement::Role(Role::Admin)),
    route("/teachers", Requirement::Role(Role::Admin)),
];

/// Outcome of one navigation: the verdict and the path that should mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub path: String,
    pub verdict: Verdict,
    pub target: String,
}

/// Strip query/fragment and a trailing slash so `/grades/?x=1` matches `/grades`.
pub fn normalize_path(raw: &str) -> String {
    let end = raw.find(|c: char| c == '?' || c == '#').unwrap_or(raw.len());
    let mut p = raw[..end].trim().to_string();
    if !p.starts_with('/') {
        p.insert(0, '/');
    }
    while p.len() > 1 && p.ends_with('/') {
        p.pop();
    }
    p
}

pub fn requirement_for(path: &str) -> Option<Requirement> {
    ROUTES
        .iter()
        .find(|r| r.path == path)
        .map(|r| r.requirement)
}

/// Evaluated fresh on every navigation; verdicts are never cached.
pub fn resolve(session: Option<&Identity>, raw_path: &str) -> Navigation {
    let path = normalize_path(raw_path);
    let verdict = match requirement_for(&path) {
        Some(req) => policy::decide(session, req),
        None => Verdict::RedirectToLogin,
    };
    let target = verdict
        .redirect_target()
        .map(str::to_string)
        .unwrap_or_else(|| path.clone());
    tracing::debug!(path = %path, verdict = ?verdict, redirect = %target, "navigation resolved");
    Navigation {
        path,
        verdict,
        target,
    }
}

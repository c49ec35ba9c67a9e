use crate::identity::{Identity, Role};
use serde::Serialize;

pub const LOGIN_PATH: &str = "/login";
pub const DEFAULT_PATH: &str = "/dashboard";

/// What a route asks of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    Authenticated,
    Role(Role),
}

impl Requirement {
    pub fn as_str(self) -> &'static str {
        match self {
            Requirement::Public => "none",
            Requirement::Authenticated => "any",
            Requirement::Role(r) => r.as_str(),
        }
    }
}

impl Serialize for Requirement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Verdict {
    Allow,
    RedirectToLogin,
    RedirectToDefault,
}

impl Verdict {
    pub fn redirect_target(self) -> Option<&'static str> {
        match self {
            Verdict::Allow => None,
            Verdict::RedirectToLogin => Some(LOGIN_PATH),
            Verdict::RedirectToDefault => Some(DEFAULT_PATH),
        }
    }
}

/// Pure access decision. Public routes mount for anyone; everything else
/// needs a session, and role routes need that exact role.
pub fn decide(session: Option<&Identity>, requirement: Requirement) -> Verdict {
    if requirement == Requirement::Public {
        return Verdict::Allow;
    }
    let Some(ident) = session else {
        return Verdict::RedirectToLogin;
    };
    match requirement {
        Requirement::Public | Requirement::Authenticated => Verdict::Allow,
        Requirement::Role(required) if ident.role == required => Verdict::Allow,
        Requirement::Role(_) => Verdict::RedirectToDefault,
    }
}

use crate::identity::{Identity, Role};
use crate::routes;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub path: &'static str,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellModel {
    pub user: Option<Identity>,
    pub role_label: Option<&'static str>,
    pub menu: Vec<MenuItem>,
}

const SHARED: &[(&str, &str)] = &[("/dashboard", "Dashboard"), ("/subjects", "Subjects")];

fn role_entries(role: Role) -> &'static [(&'static str, &'static str)] {
    match role {
        Role::Student => &[("/grades", "My Grades"), ("/attendance", "My Attendance")],
        Role::Teacher => &[
            ("/attendance-management", "Attendance Management"),
            ("/grade-management", "Grade Management"),
        ],
        Role::Admin => &[("/students", "Students"), ("/teachers", "Teachers")],
    }
}

/// Display state for the navigation chrome. Only reflects the session; the
/// router still decides what actually mounts.
pub fn model(session: Option<&Identity>, current_path: Option<&str>) -> ShellModel {
    let current = current_path.map(routes::normalize_path);
    let menu = match session {
        Some(ident) => SHARED
            .iter()
            .chain(role_entries(ident.role))
            .map(|&(path, label)| MenuItem {
                path,
                label,
                active: current.as_deref() == Some(path),
            })
            .collect(),
        None => Vec::new(),
    };
    ShellModel {
        user: session.cloned(),
        role_label: session.map(|s| s.role.label()),
        menu,
    }
}

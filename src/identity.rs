use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    /// Every boundary (restore, login response, signup form) goes through here.
    /// Unknown or absent values become `Student` instead of failing.
    pub fn normalize(raw: Option<&str>) -> Role {
        Self::parse(raw.unwrap_or_default()).unwrap_or(Role::Student)
    }

    /// Case-insensitive, `None` for anything outside the closed set.
    pub fn parse(raw: &str) -> Option<Role> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "student" => Some(Role::Student),
            "teacher" => Some(Role::Teacher),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Teacher => "Teacher",
            Role::Admin => "Admin",
        }
    }

    /// The auth service expects signup roles uppercased.
    pub fn signup_wire(self) -> String {
        self.as_str().to_ascii_uppercase()
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let v = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(Role::normalize(v.as_ref().and_then(|v| v.as_str())))
    }
}

/// The authenticated principal. `role` is canonical once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Student
}

impl Identity {
    pub fn from_json(raw: &str) -> Result<Identity, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn to_record(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "role": self.role.as_str(),
        })
    }
}

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::identity::Identity;
use chrono::NaiveDate;
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

type Extra = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Uppercase, as the auth service expects.
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub teacher_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubject {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub student_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub student_id: Option<i64>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub status: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRecord {
    pub student_id: i64,
    pub subject_id: i64,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    #[serde(default)]
    pub id: Option<i64>,
    pub student_id: i64,
    pub subject_id: i64,
    pub score: f64,
    #[serde(default)]
    pub teacher_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// The school REST service, as consumed by this client.
pub trait SchoolApi {
    fn login(&self, req: &LoginRequest) -> Result<Identity, ApiError>;
    fn signup(&self, req: &SignupRequest) -> Result<(), ApiError>;
    fn students(&self) -> Result<Vec<Person>, ApiError>;
    fn teachers(&self) -> Result<Vec<Person>, ApiError>;
    fn subjects(&self) -> Result<Vec<Subject>, ApiError>;
    fn create_subject(&self, subject: &NewSubject) -> Result<Option<Subject>, ApiError>;
    fn delete_subject(&self, id: i64) -> Result<(), ApiError>;
    fn attendance_for_user(&self, user_id: i64) -> Result<Vec<AttendanceEntry>, ApiError>;
    fn record_attendance(&self, records: &[AttendanceRecord]) -> Result<(), ApiError>;
    fn grades_for_user(&self, user_id: i64) -> Result<Vec<Grade>, ApiError>;
    fn record_grades(&self, records: &[GradeRecord]) -> Result<(), ApiError>;
}

pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(cfg: &ClientConfig) -> Result<Self, ApiError> {
        cfg.validate().map_err(ApiError::InvalidConfig)?;
        let client = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: cfg.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send_text(&self, req: RequestBuilder, what: &str) -> Result<String, ApiError> {
        let request_id = Uuid::new_v4().to_string();
        tracing::debug!(request_id = %request_id, "{}", what);
        let resp = req.header("x-request-id", &request_id).send()?;
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            tracing::debug!(request_id = %request_id, status = status.as_u16(), "{} rejected", what);
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: rejection_message(&body),
            });
        }
        Ok(body)
    }

    fn send<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<T, ApiError> {
        let body = self.send_text(req, what)?;
        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        Ok(serde_json::from_str(body)?)
    }

    fn send_unit(&self, req: RequestBuilder, what: &str) -> Result<(), ApiError> {
        self.send_text(req, what).map(|_| ())
    }
}

impl SchoolApi for HttpApi {
    fn login(&self, req: &LoginRequest) -> Result<Identity, ApiError> {
        self.send(
            self.client.post(self.url("/auth/login")).json(req),
            "POST /auth/login",
        )
    }

    fn signup(&self, req: &SignupRequest) -> Result<(), ApiError> {
        self.send_unit(
            self.client.post(self.url("/auth/signup")).json(req),
            "POST /auth/signup",
        )
    }

    fn students(&self) -> Result<Vec<Person>, ApiError> {
        self.send(self.client.get(self.url("/students")), "GET /students")
    }

    fn teachers(&self) -> Result<Vec<Person>, ApiError> {
        self.send(self.client.get(self.url("/teachers")), "GET /teachers")
    }

    fn subjects(&self) -> Result<Vec<Subject>, ApiError> {
        self.send(self.client.get(self.url("/subjects")), "GET /subjects")
    }

    fn create_subject(&self, subject: &NewSubject) -> Result<Option<Subject>, ApiError> {
        self.send(
            self.client.post(self.url("/subjects")).json(subject),
            "POST /subjects",
        )
    }

    fn delete_subject(&self, id: i64) -> Result<(), ApiError> {
        self.send_unit(
            self.client.delete(self.url(&format!("/subjects/{}", id))),
            "DELETE /subjects/{id}",
        )
    }

    fn attendance_for_user(&self, user_id: i64) -> Result<Vec<AttendanceEntry>, ApiError> {
        self.send(
            self.client
                .get(self.url(&format!("/attendance/user/{}", user_id))),
            "GET /attendance/user/{id}",
        )
    }

    fn record_attendance(&self, records: &[AttendanceRecord]) -> Result<(), ApiError> {
        self.send_unit(
            self.client
                .post(self.url("/attendance"))
                .json(&serde_json::json!({ "records": records })),
            "POST /attendance",
        )
    }

    fn grades_for_user(&self, user_id: i64) -> Result<Vec<Grade>, ApiError> {
        self.send(
            self.client.get(self.url(&format!("/grades/user/{}", user_id))),
            "GET /grades/user/{id}",
        )
    }

    fn record_grades(&self, records: &[GradeRecord]) -> Result<(), ApiError> {
        self.send_unit(
            self.client
                .post(self.url("/grades"))
                .json(&serde_json::json!({ "records": records })),
            "POST /grades",
        )
    }
}

/// Error bodies come back as plain text, a JSON string, or `{message}`/`{error}`.
fn rejection_message(body: &str) -> String {
    let trimmed = body.trim();
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(serde_json::Value::Object(obj)) => ["message", "error"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(|v| v.as_str()))
            .unwrap_or_default()
            .to_string(),
        _ => trimmed.to_string(),
    }
}

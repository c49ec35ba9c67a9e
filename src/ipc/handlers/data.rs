use crate::api::{AttendanceRecord, GradeRecord, NewSubject};
use crate::identity::{Identity, Role};
use crate::ipc::error::{api_err, err, ok, ok_json};
use crate::ipc::helpers::{get_optional_i64, get_required_str, session_store};
use crate::ipc::types::{AppState, Request};
use serde::de::DeserializeOwned;
use serde_json::json;

fn respond<T: serde::Serialize>(
    req: &Request,
    res: Result<T, crate::error::ApiError>,
) -> serde_json::Value {
    match res {
        Ok(v) => ok_json(&req.id, &v),
        Err(e) => api_err(&req.id, &e),
    }
}

/// `userId` from params, else the logged-in identity.
fn target_user(state: &mut AppState, req: &Request) -> Result<i64, serde_json::Value> {
    if let Some(id) = get_optional_i64(&req.params, "userId", &req.id)? {
        return Ok(id);
    }
    let store = session_store(&mut state.session, &req.id)?;
    store
        .current()
        .map(|u| u.id)
        .ok_or_else(|| err(&req.id, "not_authenticated", "no user is logged in", None))
}

fn parse_records<T: DeserializeOwned>(req: &Request) -> Result<Vec<T>, serde_json::Value> {
    let Some(raw) = req.params.get("records") else {
        return Err(err(&req.id, "bad_params", "missing params.records", None));
    };
    let records: Vec<T> = serde_json::from_value(raw.clone())
        .map_err(|e| err(&req.id, "bad_params", format!("invalid records: {}", e), None))?;
    if records.is_empty() {
        return Err(err(&req.id, "bad_params", "records must not be empty", None));
    }
    Ok(records)
}

fn current_user(state: &AppState) -> Option<&Identity> {
    state.session.as_ref().and_then(|s| s.current())
}

fn current_user_id(state: &AppState) -> Option<i64> {
    current_user(state).map(|u| u.id)
}

fn handle_subjects_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let name = match get_required_str(&req.params, "name", &req.id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let teacher_id = match get_optional_i64(&req.params, "teacherId", &req.id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    // A teacher creating a subject owns it.
    let teacher_id = match current_user(state) {
        Some(u) if u.role == Role::Teacher => Some(u.id),
        _ => teacher_id,
    };
    respond(req, state.api.create_subject(&NewSubject { name, teacher_id }))
}

fn handle_subjects_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match get_optional_i64(&req.params, "id", &req.id) {
        Ok(Some(v)) => v,
        Ok(None) => return err(&req.id, "bad_params", "missing params.id", None),
        Err(resp) => return resp,
    };
    match state.api.delete_subject(id) {
        Ok(()) => ok(&req.id, json!({ "deleted": id })),
        Err(e) => api_err(&req.id, &e),
    }
}

fn handle_attendance_for_user(state: &mut AppState, req: &Request) -> serde_json::Value {
    match target_user(state, req) {
        Ok(user_id) => respond(req, state.api.attendance_for_user(user_id)),
        Err(resp) => resp,
    }
}

fn handle_attendance_record(state: &mut AppState, req: &Request) -> serde_json::Value {
    let mut records: Vec<AttendanceRecord> = match parse_records(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let teacher = current_user_id(state);
    for r in records.iter_mut() {
        r.teacher_id = r.teacher_id.or(teacher);
    }
    match state.api.record_attendance(&records) {
        Ok(()) => ok(&req.id, json!({ "recorded": records.len() })),
        Err(e) => api_err(&req.id, &e),
    }
}

fn handle_grades_for_user(state: &mut AppState, req: &Request) -> serde_json::Value {
    match target_user(state, req) {
        Ok(user_id) => respond(req, state.api.grades_for_user(user_id)),
        Err(resp) => resp,
    }
}

fn handle_grades_record(state: &mut AppState, req: &Request) -> serde_json::Value {
    let mut records: Vec<GradeRecord> = match parse_records(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let teacher = current_user_id(state);
    for r in records.iter_mut() {
        r.teacher_id = r.teacher_id.or(teacher);
    }
    match state.api.record_grades(&records) {
        Ok(()) => ok(&req.id, json!({ "recorded": records.len() })),
        Err(e) => api_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(respond(req, state.api.students())),
        "teachers.list" => Some(respond(req, state.api.teachers())),
        "subjects.list" => Some(respond(req, state.api.subjects())),
        "subjects.create" => Some(handle_subjects_create(state, req)),
        "subjects.delete" => Some(handle_subjects_delete(state, req)),
        "attendance.forUser" => Some(handle_attendance_for_user(state, req)),
        "attendance.record" => Some(handle_attendance_record(state, req)),
        "grades.forUser" => Some(handle_grades_for_user(state, req)),
        "grades.record" => Some(handle_grades_record(state, req)),
        _ => None,
    }
}

use crate::api::{LoginRequest, SignupRequest};
use crate::identity::Role;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{get_required_raw_str, get_required_str, session_store};
use crate::ipc::types::{AppState, Request};
use crate::policy::{DEFAULT_PATH, LOGIN_PATH};
use serde_json::json;

fn handle_session_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match session_store(&mut state.session, &req.id) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    ok(&req.id, json!({ "user": store.current() }))
}

fn handle_session_restore(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match session_store(&mut state.session, &req.id) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    ok(&req.id, json!({ "user": store.restore() }))
}

fn handle_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match session_store(&mut state.session, &req.id) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    store.logout();
    ok(&req.id, json!({ "navigate": LOGIN_PATH }))
}

fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match session_store(&mut state.session, &req.id) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let (Ok(email), Ok(password)) = (
        get_required_str(&req.params, "email", &req.id),
        get_required_raw_str(&req.params, "password", &req.id),
    ) else {
        return err(
            &req.id,
            "bad_params",
            "Please enter both email and password.",
            None,
        );
    };

    match state.api.login(&LoginRequest { email, password }) {
        Ok(identity) => {
            tracing::info!(user_id = identity.id, role = identity.role.as_str(), "login");
            store.set(Some(identity.clone()));
            ok(
                &req.id,
                json!({ "user": identity, "navigate": DEFAULT_PATH }),
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "login failed");
            err(
                &req.id,
                "login_failed",
                e.server_message().unwrap_or("Invalid email or password"),
                Some(json!({ "cause": e.code() })),
            )
        }
    }
}

fn handle_signup(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (Ok(name), Ok(email), Ok(password)) = (
        get_required_str(&req.params, "name", &req.id),
        get_required_str(&req.params, "email", &req.id),
        get_required_raw_str(&req.params, "password", &req.id),
    ) else {
        return err(&req.id, "bad_params", "Please fill all fields.", None);
    };
    let role = Role::normalize(req.params.get("role").and_then(|v| v.as_str()));

    let signup = SignupRequest {
        name,
        email,
        password,
        role: role.signup_wire(),
    };
    match state.api.signup(&signup) {
        Ok(()) => {
            tracing::info!(role = role.as_str(), "account created");
            ok(&req.id, json!({ "navigate": LOGIN_PATH }))
        }
        Err(e) => {
            tracing::warn!(error = %e, "signup failed");
            err(
                &req.id,
                "signup_failed",
                e.server_message().unwrap_or("Unable to create account"),
                Some(json!({ "cause": e.code() })),
            )
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "session.get" => Some(handle_session_get(state, req)),
        "session.restore" => Some(handle_session_restore(state, req)),
        "session.logout" => Some(handle_logout(state, req)),
        "auth.login" => Some(handle_login(state, req)),
        "auth.signup" => Some(handle_signup(state, req)),
        _ => None,
    }
}

use crate::ipc::error::{ok, ok_json};
use crate::ipc::helpers::{get_required_str, session_store};
use crate::ipc::types::{AppState, Request};
use crate::{routes, shell};
use serde_json::json;

fn handle_resolve(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = match get_required_str(&req.params, "path", &req.id) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let store = match session_store(&mut state.session, &req.id) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    ok_json(&req.id, &routes::resolve(store.current(), &path))
}

fn handle_routes(req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "routes": routes::ROUTES }))
}

fn handle_shell_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match session_store(&mut state.session, &req.id) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let path = req.params.get("path").and_then(|v| v.as_str());
    ok_json(&req.id, &shell::model(store.current(), path))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "nav.resolve" => Some(handle_resolve(state, req)),
        "nav.routes" => Some(handle_routes(req)),
        "shell.get" => Some(handle_shell_get(state, req)),
        _ => None,
    }
}

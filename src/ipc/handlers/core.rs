use crate::api::HttpApi;
use crate::config;
use crate::db;
use crate::ipc::error::{err, ok, ok_json};
use crate::ipc::types::{AppState, Request};
use crate::session::SessionStore;
use serde_json::json;
use std::path::PathBuf;
use std::rc::Rc;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "sessionStore": state.session.is_some(),
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    let conn = match db::open_db(&path) {
        Ok(conn) => Rc::new(conn),
        Err(e) => return err(&req.id, "db_open_failed", format!("{e:?}"), None),
    };

    let cfg = config::load(&conn);
    let api = match HttpApi::new(&cfg) {
        Ok(api) => api,
        Err(e) => return err(&req.id, "api_client_failed", e.to_string(), None),
    };

    // Startup restore: whatever the last run left behind, or logged out.
    let mut store = SessionStore::new(Box::new(db::SqliteSessionStorage::new(conn.clone())));
    let user = store.restore();

    tracing::info!(
        workspace = %path.to_string_lossy(),
        api_base_url = %cfg.api_base_url,
        restored = user.is_some(),
        "workspace opened"
    );

    state.workspace = Some(path.clone());
    state.db = Some(conn);
    state.session = Some(store);
    state.config = cfg;
    state.api = Box::new(api);
    ok(
        &req.id,
        json!({ "workspacePath": path.to_string_lossy(), "user": user }),
    )
}

fn handle_config_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok_json(&req.id, &state.config)
}

fn handle_config_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let next = match state.config.merged(&req.params) {
        Ok(cfg) => cfg,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };
    let api = match HttpApi::new(&next) {
        Ok(api) => api,
        Err(e) => return err(&req.id, "api_client_failed", e.to_string(), None),
    };
    if let Some(conn) = state.db.as_ref() {
        if let Err(e) = config::save(conn, &next) {
            return err(&req.id, "db_update_failed", format!("{e:?}"), None);
        }
    }
    tracing::info!(api_base_url = %next.api_base_url, timeout_ms = next.timeout_ms, "client config updated");
    state.config = next;
    state.api = Box::new(api);
    ok_json(&req.id, &state.config)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "config.get" => Some(handle_config_get(state, req)),
        "config.update" => Some(handle_config_update(state, req)),
        _ => None,
    }
}

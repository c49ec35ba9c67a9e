use crate::ipc::error::err;
use crate::session::SessionStore;

pub fn get_required_str(params: &serde_json::Value, key: &str, id: &str) -> Result<String, serde_json::Value> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| err(id, "bad_params", format!("missing params.{}", key), None))
}

/// Like `get_required_str` but keeps the value exactly as sent. Used for secrets.
pub fn get_required_raw_str(params: &serde_json::Value, key: &str, id: &str) -> Result<String, serde_json::Value> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| err(id, "bad_params", format!("missing params.{}", key), None))
}

pub fn get_optional_i64(params: &serde_json::Value, key: &str, id: &str) -> Result<Option<i64>, serde_json::Value> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| err(id, "bad_params", format!("params.{} must be an integer", key), None)),
    }
}

/// Anything touching the session before `workspace.select` is a wiring bug in
/// the shell, so it fails loudly instead of redirecting.
pub fn session_store<'a>(
    session: &'a mut Option<SessionStore>,
    id: &str,
) -> Result<&'a mut SessionStore, serde_json::Value> {
    session.as_mut().ok_or_else(|| {
        tracing::error!("session store used before workspace.select");
        err(
            id,
            "no_session_store",
            "session store not initialized; select a workspace first",
            None,
        )
    })
}

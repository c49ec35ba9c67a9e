use crate::db;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

pub const CONFIG_KEY: &str = "client.config";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const MAX_TIMEOUT_MS: u64 = 120_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ClientConfig {
    /// Apply a partial update from IPC params, validating the merged result.
    pub fn merged(&self, params: &serde_json::Value) -> Result<ClientConfig, String> {
        let mut next = self.clone();
        if let Some(v) = params.get("apiBaseUrl") {
            let Some(url) = v.as_str() else {
                return Err("apiBaseUrl must be a string".to_string());
            };
            next.api_base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(v) = params.get("timeoutMs") {
            let Some(ms) = v.as_u64() else {
                return Err("timeoutMs must be a positive integer".to_string());
            };
            next.timeout_ms = ms;
        }
        next.validate()?;
        Ok(next)
    }

    pub fn validate(&self) -> Result<(), String> {
        let url = self.api_base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err("apiBaseUrl must start with http:// or https://".to_string());
        }
        if !(1..=MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(format!("timeoutMs must be between 1 and {}", MAX_TIMEOUT_MS));
        }
        Ok(())
    }
}

/// Stored config for the workspace. Missing or unusable values fall back to defaults.
pub fn load(conn: &Connection) -> ClientConfig {
    let stored = match db::settings_get_json(conn, CONFIG_KEY) {
        Ok(Some(v)) => v,
        Ok(None) => return ClientConfig::default(),
        Err(e) => {
            tracing::warn!(error = %e, "stored client config unreadable; using defaults");
            return ClientConfig::default();
        }
    };
    match serde_json::from_value::<ClientConfig>(stored) {
        Ok(cfg) if cfg.validate().is_ok() => cfg,
        _ => {
            tracing::warn!("stored client config invalid; using defaults");
            ClientConfig::default()
        }
    }
}

pub fn save(conn: &Connection, cfg: &ClientConfig) -> anyhow::Result<()> {
    db::settings_set_json(conn, CONFIG_KEY, &serde_json::to_value(cfg)?)
}

use std::path::PathBuf;
use std::rc::Rc;

use rusqlite::Connection;
use serde::Deserialize;

use crate::api::{HttpApi, SchoolApi};
use crate::config::ClientConfig;
use crate::session::SessionStore;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Rc<Connection>>,
    /// Created by `workspace.select`; absent until then.
    pub session: Option<SessionStore>,
    pub config: ClientConfig,
    pub api: Box<dyn SchoolApi>,
}

impl AppState {
    pub fn new() -> anyhow::Result<Self> {
        let config = ClientConfig::default();
        let api = HttpApi::new(&config)?;
        Ok(Self {
            workspace: None,
            db: None,
            session: None,
            config,
            api: Box::new(api),
        })
    }
}

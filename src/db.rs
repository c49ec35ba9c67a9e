use crate::session::SessionStorage;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::rc::Rc;

pub const DB_FILE: &str = "schoold.sqlite3";
pub const SESSION_KEY: &str = "session.user";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT
        )",
        [],
    )?;

    Ok(conn)
}

pub fn settings_get_raw(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    let v = conn
        .query_row("SELECT value FROM settings WHERE key = ?", [key], |r| {
            r.get::<_, String>(0)
        })
        .optional()?;
    Ok(v)
}

pub fn settings_set_raw(conn: &Connection, key: &str, value: &str) -> anyhow::Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO settings(key, value, updated_at) VALUES(?, ?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        (key, value, now),
    )?;
    Ok(())
}

pub fn settings_delete(conn: &Connection, key: &str) -> anyhow::Result<()> {
    conn.execute("DELETE FROM settings WHERE key = ?", [key])?;
    Ok(())
}

pub fn settings_get_json(conn: &Connection, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
    match settings_get_raw(conn, key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub fn settings_set_json(conn: &Connection, key: &str, value: &serde_json::Value) -> anyhow::Result<()> {
    settings_set_raw(conn, key, &serde_json::to_string(value)?)
}

/// Session record kept in the workspace settings table.
pub struct SqliteSessionStorage {
    conn: Rc<Connection>,
}

impl SqliteSessionStorage {
    pub fn new(conn: Rc<Connection>) -> Self {
        Self { conn }
    }
}

impl SessionStorage for SqliteSessionStorage {
    fn read(&self) -> anyhow::Result<Option<String>> {
        settings_get_raw(&self.conn, SESSION_KEY)
    }

    fn write(&mut self, record: &str) -> anyhow::Result<()> {
        settings_set_raw(&self.conn, SESSION_KEY, record)
    }

    fn erase(&mut self) -> anyhow::Result<()> {
        settings_delete(&self.conn, SESSION_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Identity, Role};
    use crate::session::SessionStore;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!(
            "{}-{}",
            prefix,
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        std::fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    #[test]
    fn session_record_survives_reopen() {
        let workspace = temp_dir("schoold-db-session");
        let admin = Identity {
            id: 11,
            name: "Root".into(),
            email: "root@school.test".into(),
            role: Role::Admin,
        };
        {
            let conn = Rc::new(open_db(&workspace).expect("open db"));
            let mut store = SessionStore::new(Box::new(SqliteSessionStorage::new(conn)));
            store.set(Some(admin.clone()));
        }
        let conn = Rc::new(open_db(&workspace).expect("reopen db"));
        let raw = settings_get_raw(&conn, SESSION_KEY)
            .expect("read")
            .expect("record present");
        assert!(raw.contains("\"role\":\"admin\""));

        let mut store = SessionStore::new(Box::new(SqliteSessionStorage::new(conn.clone())));
        assert_eq!(store.restore(), Some(admin));

        store.logout();
        assert_eq!(settings_get_raw(&conn, SESSION_KEY).expect("read"), None);
        let _ = std::fs::remove_dir_all(workspace);
    }

    #[test]
    fn json_settings_roundtrip_and_delete() {
        let workspace = temp_dir("schoold-db-settings");
        let conn = open_db(&workspace).expect("open db");
        settings_set_json(&conn, "k", &serde_json::json!({ "a": 1 })).expect("set");
        settings_set_json(&conn, "k", &serde_json::json!({ "a": 2 })).expect("overwrite");
        assert_eq!(
            settings_get_json(&conn, "k").expect("get"),
            Some(serde_json::json!({ "a": 2 }))
        );
        settings_delete(&conn, "k").expect("delete");
        assert_eq!(settings_get_json(&conn, "k").expect("get"), None);

        settings_set_raw(&conn, "bad", "{oops").expect("set raw");
        assert!(settings_get_json(&conn, "bad").is_err());
        let _ = std::fs::remove_dir_all(workspace);
    }
}

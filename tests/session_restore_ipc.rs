use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
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

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_schoold");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn schoold");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

/// Writes the durable record behind the sidecar's back, as a stale or
/// hand-edited file would.
fn write_record(workspace: &Path, raw: &str) {
    let conn = rusqlite::Connection::open(workspace.join("schoold.sqlite3")).expect("open sqlite");
    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings(key TEXT PRIMARY KEY, value TEXT NOT NULL, updated_at TEXT)",
        [],
    )
    .expect("create settings");
    conn.execute(
        "INSERT OR REPLACE INTO settings(key, value) VALUES('session.user', ?)",
        [raw],
    )
    .expect("write record");
}

fn read_record(workspace: &Path) -> Option<String> {
    let conn = rusqlite::Connection::open(workspace.join("schoold.sqlite3")).expect("open sqlite");
    conn.query_row(
        "SELECT value FROM settings WHERE key = 'session.user'",
        [],
        |r| r.get::<_, String>(0),
    )
    .ok()
}

fn verdict(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    path: &str,
) -> (String, String) {
    let nav = request_ok(stdin, reader, id, "nav.resolve", json!({ "path": path }));
    (
        nav["verdict"].as_str().unwrap_or_default().to_string(),
        nav["target"].as_str().unwrap_or_default().to_string(),
    )
}

#[test]
fn startup_restore_normalizes_role() {
    let workspace = temp_dir("schoold-restore-upper");
    write_record(
        &workspace,
        r#"{"id":12,"name":"Sam","email":"sam@school.test","role":"STUDENT"}"#,
    );

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    assert_eq!(opened["user"]["id"], 12);
    assert_eq!(opened["user"]["role"], "student");

    assert_eq!(
        verdict(&mut stdin, &mut reader, "2", "/grades"),
        ("allow".to_string(), "/grades".to_string())
    );
    assert_eq!(
        verdict(&mut stdin, &mut reader, "3", "/teachers"),
        ("redirectToDefault".to_string(), "/dashboard".to_string())
    );

    // Reads never rewrite the durable record.
    assert_eq!(
        read_record(&workspace).as_deref(),
        Some(r#"{"id":12,"name":"Sam","email":"sam@school.test","role":"STUDENT"}"#)
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn missing_or_unknown_role_becomes_student() {
    let workspace = temp_dir("schoold-restore-missing-role");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    write_record(&workspace, r#"{"id":3,"name":"NoRole","email":"n@school.test"}"#);
    let restored = request_ok(&mut stdin, &mut reader, "2", "session.restore", json!({}));
    assert_eq!(restored["user"]["role"], "student");

    write_record(&workspace, r#"{"id":3,"name":"Odd","email":"o@school.test","role":"janitor"}"#);
    let restored = request_ok(&mut stdin, &mut reader, "3", "session.restore", json!({}));
    assert_eq!(restored["user"]["role"], "student");
    assert_eq!(restored["user"]["name"], "Odd");

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn corrupt_record_means_logged_out() {
    let workspace = temp_dir("schoold-restore-corrupt");
    write_record(&workspace, "{\"id\": 5, \"name\": ");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    assert!(opened["user"].is_null());

    assert_eq!(
        verdict(&mut stdin, &mut reader, "2", "/dashboard"),
        ("redirectToLogin".to_string(), "/login".to_string())
    );
    assert_eq!(
        verdict(&mut stdin, &mut reader, "3", "/signup"),
        ("allow".to_string(), "/signup".to_string())
    );

    let shell = request_ok(&mut stdin, &mut reader, "4", "shell.get", json!({}));
    assert!(shell["user"].is_null());
    assert_eq!(shell["menu"].as_array().map(|m| m.len()), Some(0));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn verdicts_follow_the_current_session() {
    let workspace = temp_dir("schoold-nav-scenarios");
    write_record(
        &workspace,
        r#"{"id":1,"name":"Ada","email":"ada@school.test","role":"admin"}"#,
    );

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    assert_eq!(
        verdict(&mut stdin, &mut reader, "2", "/subjects"),
        ("allow".to_string(), "/subjects".to_string())
    );
    assert_eq!(
        verdict(&mut stdin, &mut reader, "3", "/students"),
        ("allow".to_string(), "/students".to_string())
    );
    assert_eq!(
        verdict(&mut stdin, &mut reader, "4", "/grade-management"),
        ("redirectToDefault".to_string(), "/dashboard".to_string())
    );
    assert_eq!(
        verdict(&mut stdin, &mut reader, "5", "/no-such-page"),
        ("redirectToLogin".to_string(), "/login".to_string())
    );

    let shell = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "shell.get",
        json!({ "path": "/students" }),
    );
    assert_eq!(shell["roleLabel"], "Admin");
    let paths: Vec<&str> = shell["menu"]
        .as_array()
        .expect("menu")
        .iter()
        .filter_map(|m| m["path"].as_str())
        .collect();
    assert_eq!(paths, vec!["/dashboard", "/subjects", "/students", "/teachers"]);
    let active: Vec<&str> = shell["menu"]
        .as_array()
        .expect("menu")
        .iter()
        .filter(|m| m["active"] == true)
        .filter_map(|m| m["path"].as_str())
        .collect();
    assert_eq!(active, vec!["/students"]);

    // Logout is idempotent and the very next navigation sees it.
    let out = request_ok(&mut stdin, &mut reader, "7", "session.logout", json!({}));
    assert_eq!(out["navigate"], "/login");
    assert_eq!(read_record(&workspace), None);
    let out = request_ok(&mut stdin, &mut reader, "8", "session.logout", json!({}));
    assert_eq!(out["navigate"], "/login");
    assert_eq!(
        verdict(&mut stdin, &mut reader, "9", "/subjects"),
        ("redirectToLogin".to_string(), "/login".to_string())
    );
    let session = request_ok(&mut stdin, &mut reader, "10", "session.get", json!({}));
    assert!(session["user"].is_null());

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

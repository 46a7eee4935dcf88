use crate::state::StoreDoc;
use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILE_NAME: &str = "quickadd.sqlite3";
/// Same key the browser build used for its local-storage entry.
pub const STORE_KEY: &str = "quickAddStore.v1";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE_NAME);
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings(
            key TEXT PRIMARY KEY,
            value_json TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

pub fn kv_get(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    let v = conn
        .query_row("SELECT value FROM kv WHERE key = ?", [key], |r| r.get(0))
        .optional()?;
    Ok(v)
}

pub fn kv_set(conn: &Connection, key: &str, value: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO kv(key, value) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (key, value),
    )?;
    Ok(())
}

/// Parses a document, failing on anything that is not one.
pub fn parse_state_strict(text: &str) -> anyhow::Result<StoreDoc> {
    serde_json::from_str(text).context("not a quick-add state document")
}

/// Parses a stored document. Anything unreadable becomes a fresh default
/// document rather than an error.
pub fn parse_state(text: &str) -> StoreDoc {
    parse_state_strict(text).unwrap_or_else(|e| {
        log::warn!(
            "event=state_parse module=db status=reset error={}",
            format!("{e:#}").replace(' ', "_")
        );
        StoreDoc::default()
    })
}

pub fn load_state(conn: &Connection) -> anyhow::Result<StoreDoc> {
    let raw = kv_get(conn, STORE_KEY).context("failed to read stored state")?;
    Ok(match raw {
        Some(text) => parse_state(&text),
        None => StoreDoc::default(),
    })
}

pub fn save_state(conn: &Connection, doc: &StoreDoc) -> anyhow::Result<()> {
    let text = serde_json::to_string(doc).context("failed to serialize state")?;
    kv_set(conn, STORE_KEY, &text).context("failed to write stored state")?;
    log::debug!(
        "event=state_save module=db status=ok classes={} notes={} bytes={}",
        doc.classes.len(),
        doc.quick_adds.len(),
        text.len()
    );
    Ok(())
}

pub fn settings_get_json(conn: &Connection, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
    let raw: Option<String> = conn
        .query_row("SELECT value_json FROM settings WHERE key = ?", [key], |r| {
            r.get(0)
        })
        .optional()?;
    match raw {
        Some(s) => Ok(Some(
            serde_json::from_str(&s).with_context(|| format!("setting {key} is invalid JSON"))?,
        )),
        None => Ok(None),
    }
}

pub fn settings_set_json(conn: &Connection, key: &str, value: &serde_json::Value) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value_json) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json",
        (key, value.to_string()),
    )?;
    Ok(())
}

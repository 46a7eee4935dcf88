use crate::db;
use crate::ipc::error::{reply, HandlerErr};
use crate::ipc::handlers::settings::load_parser;
use crate::ipc::helpers::{persist, require_path, require_workspace};
use crate::ipc::types::{AppState, Request};
use anyhow::Context;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Opens (or creates) the workspace store and loads its document and parser
/// settings into the session.
pub fn open_workspace(state: &mut AppState, path: &Path) -> anyhow::Result<()> {
    let conn = db::open_db(path)
        .with_context(|| format!("failed to open workspace {}", path.to_string_lossy()))?;
    let doc = db::load_state(&conn)?;
    let parser = load_parser(&conn);

    log::info!(
        "event=workspace_open module=core status=ok classes={} notes={}",
        doc.classes.len(),
        doc.quick_adds.len()
    );

    state.workspace = Some(path.to_path_buf());
    state.doc = doc;
    state.parser = parser;
    state.db = Some(conn);
    Ok(())
}

fn handle_health(state: &mut AppState, _req: &Request) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
    }))
}

fn handle_workspace_select(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let path = PathBuf::from(require_path(req, "path")?);
    open_workspace(state, &path)
        .map_err(|e| HandlerErr::new("db_open_failed", format!("{e:#}")))?;
    Ok(json!({
        "workspacePath": path.to_string_lossy(),
        "classCount": state.doc.classes.len(),
        "userName": state.doc.user_name,
    }))
}

/// Replaces the document with a dump of the browser build's local-storage
/// value. A dump that is not a valid document is rejected and leaves the
/// workspace untouched. Imported rosters are normalized before saving.
fn handle_import_browser_state(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let in_path = require_path(req, "inPath")?;
    let text = std::fs::read_to_string(&in_path).map_err(|e| {
        HandlerErr::new("io_failed", e.to_string()).with_details(json!({ "path": in_path }))
    })?;

    let mut doc = db::parse_state_strict(&text).map_err(|e| {
        HandlerErr::new("bad_params", format!("{e:#}")).with_details(json!({ "path": in_path }))
    })?;
    let dropped = doc.normalize_rosters(state.roster_parser());
    state.doc = doc;
    persist(state)?;

    log::info!(
        "event=browser_import module=core status=ok classes={} notes={} roster_dropped={}",
        state.doc.classes.len(),
        state.doc.quick_adds.len(),
        dropped
    );
    Ok(json!({
        "classCount": state.doc.classes.len(),
        "studentCount": state.doc.students.len(),
        "noteCount": state.doc.quick_adds.len(),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "health" => handle_health(state, req),
        "workspace.select" => handle_workspace_select(state, req),
        "workspace.importBrowserState" => handle_import_browser_state(state, req),
        _ => return None,
    };
    Some(reply(&req.id, res))
}

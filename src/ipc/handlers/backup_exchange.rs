use crate::backup;
use crate::export;
use crate::ipc::error::{reply, HandlerErr};
use crate::ipc::handlers::core::open_workspace;
use crate::ipc::helpers::{require_path, require_workspace};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_backup_export_workspace_bundle(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let out_path = require_path(req, "outPath")?;
    let Some(workspace_path) = state.workspace.clone() else {
        return Err(HandlerErr::no_workspace());
    };

    if let Some(conn) = state.db.as_ref() {
        let _ = conn.execute_batch("PRAGMA wal_checkpoint(FULL)");
    }

    let export = backup::export_workspace_bundle(&workspace_path, &PathBuf::from(&out_path))
        .map_err(|e| {
            HandlerErr::new("io_failed", format!("{e:#}")).with_details(json!({ "path": out_path }))
        })?;

    log::info!("event=backup_export module=backup status=ok entries={}", export.entry_count);
    Ok(json!({
        "path": out_path,
        "bundleFormat": backup::BUNDLE_FORMAT_V1,
        "entryCount": export.entry_count,
        "dbSha256": export.db_sha256,
    }))
}

fn handle_backup_import_workspace_bundle(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let in_path = require_path(req, "inPath")?;
    let Some(workspace_path) = state.workspace.clone() else {
        return Err(HandlerErr::no_workspace());
    };

    let src = PathBuf::from(&in_path);
    if !src.is_file() {
        return Err(HandlerErr::new("not_found", "bundle file not found")
            .with_details(json!({ "path": in_path })));
    }

    // Drop open handle before replacing file.
    state.db = None;

    let imported = backup::import_workspace_bundle(&src, &workspace_path);
    // Reopen either way so a failed import leaves the old store usable.
    let reopened = open_workspace(state, &workspace_path);

    let import = imported.map_err(|e| {
        HandlerErr::new("io_failed", format!("{e:#}")).with_details(json!({ "path": in_path }))
    })?;
    reopened.map_err(|e| HandlerErr::new("db_open_failed", format!("{e:#}")))?;

    log::info!(
        "event=backup_import module=backup status=ok bytes={}",
        import.bytes
    );
    Ok(json!({
        "workspacePath": workspace_path.to_string_lossy(),
        "dbSha256": import.db_sha256,
        "checksumVerified": true,
        "classCount": state.doc.classes.len(),
    }))
}

fn handle_exchange_export_notes_csv(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let out_path = require_path(req, "outPath")?;
    let (csv, rows_exported) = export::notes_csv(&state.doc);

    let io_err = |e: std::io::Error| {
        HandlerErr::new("io_failed", e.to_string()).with_details(json!({ "path": out_path }))
    };
    let out = PathBuf::from(&out_path);
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(&out, csv).map_err(io_err)?;

    Ok(json!({ "rowsExported": rows_exported, "path": out_path }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "backup.exportWorkspaceBundle" => handle_backup_export_workspace_bundle(state, req),
        "backup.importWorkspaceBundle" => handle_backup_import_workspace_bundle(state, req),
        "exchange.exportNotesCsv" => handle_exchange_export_notes_csv(state, req),
        _ => return None,
    };
    Some(reply(&req.id, res))
}

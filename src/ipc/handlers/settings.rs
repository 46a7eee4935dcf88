use crate::config::METADATA_PATTERNS_KEY;
use crate::db;
use crate::ipc::error::{reply, HandlerErr};
use crate::ipc::helpers::require_workspace;
use crate::ipc::types::{AppState, Request};
use crate::roster::RosterParser;
use rusqlite::Connection;
use serde_json::json;

/// Builds the workspace roster parser from stored settings. `None` (nothing
/// stored, an empty list, or an unusable pattern) means the default pattern.
pub fn load_parser(conn: &Connection) -> Option<RosterParser> {
    let stored = match db::settings_get_json(conn, METADATA_PATTERNS_KEY) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("event=settings_load module=settings status=error error={e}");
            None
        }
    };
    let patterns: Vec<String> = stored
        .as_ref()
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default();
    if patterns.is_empty() {
        return None;
    }

    match RosterParser::with_patterns(&patterns) {
        Ok(parser) => Some(parser),
        Err(e) => {
            log::warn!("event=settings_load module=settings status=bad_pattern error={e}");
            None
        }
    }
}

fn handle_settings_get(state: &mut AppState, _req: &Request) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "metadataPatterns": state.roster_parser().patterns() }))
}

fn handle_settings_set(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let Some(items) = req.params.get("metadataPatterns").and_then(|v| v.as_array()) else {
        return Err(HandlerErr::new("bad_params", "missing metadataPatterns"));
    };
    let mut patterns: Vec<String> = Vec::new();
    for item in items {
        let Some(p) = item.as_str() else {
            return Err(HandlerErr::new("bad_params", "metadataPatterns must be strings"));
        };
        patterns.push(p.to_string());
    }

    let parser = RosterParser::with_patterns(&patterns).map_err(|e| {
        HandlerErr::new("bad_pattern", e.to_string()).with_details(json!({ "patterns": patterns }))
    })?;

    let Some(conn) = state.db.as_ref() else {
        return Err(HandlerErr::no_workspace());
    };
    db::settings_set_json(conn, METADATA_PATTERNS_KEY, &json!(patterns))
        .map_err(|e| HandlerErr::new("db_save_failed", format!("{e:#}")))?;
    state.parser = if patterns.is_empty() { None } else { Some(parser) };

    Ok(json!({ "metadataPatterns": state.roster_parser().patterns() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "settings.get" => handle_settings_get(state, req),
        "settings.set" => handle_settings_set(state, req),
        _ => return None,
    };
    Some(reply(&req.id, res))
}

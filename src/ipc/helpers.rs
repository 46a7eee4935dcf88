use crate::db;
use crate::ipc::error::HandlerErr;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

pub fn param_str<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.params.get(key).and_then(|v| v.as_str())
}

pub fn require_str<'a>(req: &'a Request, key: &str) -> Result<&'a str, HandlerErr> {
    param_str(req, key).ok_or_else(|| HandlerErr::new("bad_params", format!("missing {key}")))
}

/// A trimmed, non-empty path parameter.
pub fn require_path(req: &Request, key: &str) -> Result<String, HandlerErr> {
    match param_str(req, key) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(HandlerErr::new("bad_params", format!("missing {key}"))),
    }
}

/// String-array parameter; non-string items are skipped, absence is empty.
pub fn param_str_list(req: &Request, key: &str) -> Vec<String> {
    req.params
        .get(key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

pub fn require_workspace(state: &AppState) -> Result<(), HandlerErr> {
    if state.db.is_none() {
        return Err(HandlerErr::no_workspace());
    }
    Ok(())
}

/// Writes the whole document back to the workspace store.
pub fn persist(state: &AppState) -> Result<(), HandlerErr> {
    let Some(conn) = state.db.as_ref() else {
        return Err(HandlerErr::no_workspace());
    };
    db::save_state(conn, &state.doc).map_err(|e| {
        log::error!("event=state_save module=ipc status=error");
        HandlerErr::new("db_save_failed", format!("{e:#}")).with_details(json!({ "key": db::STORE_KEY }))
    })
}

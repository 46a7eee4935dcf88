use crate::ipc::error::{reply, HandlerErr};
use crate::ipc::helpers::{param_str, param_str_list, persist, require_str, require_workspace};
use crate::ipc::types::{AppState, Request};
use crate::state::DEFAULT_NOTES_LIMIT;
use chrono::Utc;
use serde_json::json;

fn handle_notes_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let class_id = require_str(req, "classId")?;
    let students = param_str_list(req, "students");
    let note = param_str(req, "note").unwrap_or("");

    let entry = state
        .doc
        .add_note(class_id, students, note, Utc::now().timestamp_millis())
        .ok_or_else(|| HandlerErr::class_not_found(class_id))?;
    let result = json!({ "note": entry });
    persist(state)?;

    log::info!(
        "event=note_create module=notes status=ok students={}",
        result["note"]["students"].as_array().map(|a| a.len()).unwrap_or(0)
    );
    Ok(result)
}

fn handle_notes_list(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let class_id = require_str(req, "classId")?;
    if state.doc.class(class_id).is_none() {
        return Err(HandlerErr::class_not_found(class_id));
    }
    let limit = req
        .params
        .get("limit")
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .unwrap_or(DEFAULT_NOTES_LIMIT);

    let notes = state.doc.notes_for_class(class_id, limit);
    Ok(json!({ "notes": notes, "total": state.doc.note_count(class_id) }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "notes.create" => handle_notes_create(state, req),
        "notes.list" => handle_notes_list(state, req),
        _ => return None,
    };
    Some(reply(&req.id, res))
}

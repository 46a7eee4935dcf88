use crate::ipc::error::{reply, HandlerErr};
use crate::ipc::helpers::{param_str, persist, require_str, require_workspace};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_classes_list(state: &mut AppState, _req: &Request) -> Result<serde_json::Value, HandlerErr> {
    // Counts let the dashboard tiles render without a second round trip.
    let classes: Vec<serde_json::Value> = state
        .doc
        .classes
        .iter()
        .map(|c| {
            json!({
                "id": c.id,
                "name": c.name,
                "block": c.block,
                "color": c.color,
                "label": c.label(),
                "studentCount": c.roster.len(),
                "noteCount": state.doc.note_count(&c.id),
            })
        })
        .collect();
    Ok(json!({ "classes": classes }))
}

fn handle_classes_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let name = require_str(req, "name")?;
    let block = param_str(req, "block").unwrap_or("");

    let class = state
        .doc
        .create_class(name, block)
        .ok_or_else(|| HandlerErr::new("bad_params", "name must not be empty"))?;
    let result = json!({
        "classId": class.id,
        "name": class.name,
        "block": class.block,
        "color": class.color,
    });
    persist(state)?;

    log::info!(
        "event=class_create module=classes status=ok classes={}",
        state.doc.classes.len()
    );
    Ok(result)
}

fn handle_classes_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let class_id = require_str(req, "classId")?;

    let notes_removed = state
        .doc
        .delete_class(class_id)
        .ok_or_else(|| HandlerErr::class_not_found(class_id))?;
    persist(state)?;

    log::info!(
        "event=class_delete module=classes status=ok notes_removed={}",
        notes_removed
    );
    Ok(json!({ "classId": class_id, "notesRemoved": notes_removed }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "classes.list" => handle_classes_list(state, req),
        "classes.create" => handle_classes_create(state, req),
        "classes.delete" => handle_classes_delete(state, req),
        _ => return None,
    };
    Some(reply(&req.id, res))
}

use crate::ipc::error::{reply, HandlerErr};
use crate::ipc::helpers::{persist, require_str, require_workspace};
use crate::ipc::types::{AppState, Request};
use crate::roster;
use crate::state::sorted_roster;
use serde_json::json;

fn handle_students_list(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let class_id = require_str(req, "classId")?;
    let class = state
        .doc
        .class(class_id)
        .ok_or_else(|| HandlerErr::class_not_found(class_id))?;
    Ok(json!({
        "classId": class.id,
        "students": class.roster,
        "sorted": sorted_roster(&class.roster),
        "count": class.roster.len(),
    }))
}

fn handle_students_add(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let class_id = require_str(req, "classId")?;
    let name = require_str(req, "name")?;

    let (roster, all_students) = state
        .doc
        .roster_and_students(class_id)
        .ok_or_else(|| HandlerErr::class_not_found(class_id))?;
    let added = roster::add_student(roster, all_students, name);
    let count = roster.len();
    if added {
        persist(state)?;
    }
    Ok(json!({ "added": added, "count": count }))
}

fn handle_students_add_bulk(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let class_id = require_str(req, "classId")?;
    let text = require_str(req, "text")?;

    let parsed = state.parse_roster(text);
    let (roster, all_students) = state
        .doc
        .roster_and_students(class_id)
        .ok_or_else(|| HandlerErr::class_not_found(class_id))?;
    let added = roster::add_students(roster, all_students, &parsed);
    let count = roster.len();
    // Nothing new means nothing to write.
    if added > 0 {
        persist(state)?;
    }

    log::info!(
        "event=roster_bulk_add module=students status=ok parsed={} added={}",
        parsed.len(),
        added
    );
    Ok(json!({ "added": added, "parsed": parsed, "count": count }))
}

fn handle_students_remove(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let class_id = require_str(req, "classId")?;
    let name = require_str(req, "name")?;

    let class = state
        .doc
        .class_mut(class_id)
        .ok_or_else(|| HandlerErr::class_not_found(class_id))?;
    let removed = roster::remove_student(&mut class.roster, name);
    let count = class.roster.len();
    if removed {
        persist(state)?;
    }
    Ok(json!({ "removed": removed, "count": count }))
}

fn handle_students_clear(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let class_id = require_str(req, "classId")?;

    let class = state
        .doc
        .class_mut(class_id)
        .ok_or_else(|| HandlerErr::class_not_found(class_id))?;
    let removed = roster::clear_roster(&mut class.roster);
    if removed > 0 {
        persist(state)?;
    }

    log::info!(
        "event=roster_clear module=students status=ok removed={}",
        removed
    );
    Ok(json!({ "removed": removed, "count": 0 }))
}

fn handle_students_all(state: &mut AppState, _req: &Request) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "students": state.doc.students }))
}

fn handle_roster_parse(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let text = require_str(req, "text")?;
    let names = state.parse_roster(text);
    Ok(json!({ "names": names, "count": names.len() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "students.list" => handle_students_list(state, req),
        "students.add" => handle_students_add(state, req),
        "students.addBulk" => handle_students_add_bulk(state, req),
        "students.remove" => handle_students_remove(state, req),
        "students.clear" => handle_students_clear(state, req),
        "students.all" => handle_students_all(state, req),
        "roster.parse" => handle_roster_parse(state, req),
        _ => return None,
    };
    Some(reply(&req.id, res))
}

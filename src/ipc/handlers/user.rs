use crate::ipc::error::{reply, HandlerErr};
use crate::ipc::helpers::{persist, require_str, require_workspace};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_user_get(state: &mut AppState, _req: &Request) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "userName": state.doc.user_name }))
}

fn handle_user_set_name(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let name = require_str(req, "name")?;
    state.doc.set_user_name(name);
    persist(state)?;
    Ok(json!({ "userName": state.doc.user_name }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let res = match req.method.as_str() {
        "user.get" => handle_user_get(state, req),
        "user.setName" => handle_user_set_name(state, req),
        _ => return None,
    };
    Some(reply(&req.id, res))
}

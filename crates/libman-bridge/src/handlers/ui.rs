//! UI side-effect handlers.

use super::shared::{get_bool_param, require_str_param};
use crate::server::AppState;
use serde_json::{json, Value};

/// Hand pending toasts, badges and navigations to the front end.
pub fn drain_ui_events(state: &AppState, _params: &Value) -> libman_core::Result<Value> {
    Ok(serde_json::to_value(state.ui.drain())?)
}

pub fn get_route_badge(state: &AppState, params: &Value) -> libman_core::Result<Value> {
    let route = require_str_param(params, "route", "route")?;
    Ok(json!({ "route": route, "count": state.ui.badge(&route) }))
}

/// Report whether the front end has a router that can follow navigations.
pub fn attach_router(state: &AppState, params: &Value) -> libman_core::Result<Value> {
    let attached = get_bool_param(params, "attached", "attached").unwrap_or(true);
    state.ui.attach_router(attached);
    Ok(json!({ "attached": attached }))
}

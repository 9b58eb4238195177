//! Store inspection and lifecycle handlers.

use super::shared::{require_param, require_str_param};
use crate::server::AppState;
use libman_core::{LibmanError, LibraryStorage};
use serde_json::{json, Value};
use tracing::info;

/// Current value of one slot, `null` when unloaded.
pub fn get_slot(state: &AppState, params: &Value) -> libman_core::Result<Value> {
    let key = require_str_param(params, "key", "key")?;
    Ok(state.manager.store().get(&key)?.unwrap_or(Value::Null))
}

/// Every loaded slot.
pub fn get_store(state: &AppState, _params: &Value) -> libman_core::Result<Value> {
    let snapshot = state.manager.store().snapshot()?;
    Ok(serde_json::to_value(snapshot)?)
}

/// Signal that the front end restored its persisted state.
pub fn store_ready(state: &AppState, _params: &Value) -> libman_core::Result<Value> {
    state.manager.mark_store_ready();
    Ok(json!({ "ready": true }))
}

/// Replace the configured storages, e.g. after a project was opened.
pub fn set_storages(state: &AppState, params: &Value) -> libman_core::Result<Value> {
    let raw = require_param(params, "storages", "storages")?;
    let storages: Vec<LibraryStorage> =
        serde_json::from_value(raw.clone()).map_err(|e| LibmanError::InvalidParams {
            message: format!("Invalid storages: {}", e),
        })?;
    info!("Configured {} library storages", storages.len());
    let count = storages.len();
    state.storages.replace(storages)?;
    Ok(json!({ "count": count }))
}

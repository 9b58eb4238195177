//! Action dispatch handlers.

use super::shared::{get_bool_param, require_param};
use crate::server::AppState;
use libman_core::{ActionRequest, Completion, LibmanError};
use serde_json::{json, Value};
use tokio::sync::oneshot;
use tracing::debug;

/// Copy an error borrowed from a completion callback so it can leave it.
fn owned_error(err: &LibmanError) -> LibmanError {
    match err {
        LibmanError::Rpc {
            code,
            message,
            data,
        } => LibmanError::Rpc {
            code: *code,
            message: message.clone(),
            data: data.clone(),
        },
        LibmanError::Transport { message, .. } => LibmanError::Transport {
            message: message.clone(),
            source: None,
        },
        LibmanError::Cancelled => LibmanError::Cancelled,
        other => LibmanError::Other(other.to_string()),
    }
}

/// Dispatch an action.
///
/// Install, uninstall and update answer once the operation finished, with
/// the backend output or its error. Other actions answer immediately unless
/// `wait` is set, in which case the spawned task is awaited; actions handled
/// by a watcher loop cannot be awaited and report `queued`.
pub async fn dispatch(state: &AppState, params: &Value) -> libman_core::Result<Value> {
    let raw = require_param(params, "action", "action")?;
    let request: ActionRequest =
        serde_json::from_value(raw.clone()).map_err(|e| LibmanError::InvalidParams {
            message: format!("Invalid action: {}", e),
        })?;
    debug!("Dispatching {:?}", request);

    if request.takes_completion() {
        let (tx, rx) = oneshot::channel::<libman_core::Result<Value>>();
        let on_end: Completion = Box::new(move |err: Option<&LibmanError>, result: Option<&Value>| {
            let outcome = match err {
                Some(err) => Err(owned_error(err)),
                None => Ok(result.cloned().unwrap_or(Value::Null)),
            };
            let _ = tx.send(outcome);
        });
        state.manager.dispatch(request.into_action(Some(on_end)));

        let output = rx.await.map_err(|_| LibmanError::Cancelled)??;
        return Ok(json!({ "output": output }));
    }

    let wait = get_bool_param(params, "wait", "wait").unwrap_or(false);
    match state.manager.dispatch(request.into_action(None)) {
        Some(task) if wait => {
            task.await.map_err(|e| {
                if e.is_cancelled() {
                    LibmanError::Cancelled
                } else {
                    LibmanError::Other(format!("Action task failed: {}", e))
                }
            })?;
            Ok(json!({ "dispatched": true }))
        }
        Some(_) => Ok(json!({ "dispatched": true })),
        None => Ok(json!({ "dispatched": true, "queued": true })),
    }
}

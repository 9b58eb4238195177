//! Request handlers, one per action type.
//!
//! Each handler checks the store, calls the backend, and writes the result
//! back. Remote failures are surfaced through the `UiSink` and then returned
//! so the dispatcher can log them; cached state is never touched on failure.

pub mod auto_check;
pub mod builtin;
pub mod data;
pub mod install;
pub mod installed;
pub mod registry;
pub mod search;
pub mod stats;
pub mod uninstall;
pub mod updates;

use crate::api::HandlerContext;
use crate::rpc::CoreCommand;
use crate::Result;
use serde_json::Value;

/// Run `command`, raising an error toast titled `title` on failure.
pub(crate) async fn call_or_notify(
    ctx: &HandlerContext,
    command: CoreCommand,
    title: &str,
) -> Result<Value> {
    match command.call(ctx.rpc()).await {
        Ok(result) => Ok(result),
        Err(err) => {
            ctx.ui().notify_error(title, &err);
            Err(err)
        }
    }
}

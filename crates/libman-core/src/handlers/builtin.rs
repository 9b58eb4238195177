//! Libraries bundled with installed frameworks.

use super::call_or_notify;
use crate::api::HandlerContext;
use crate::config::StoreKeys;
use crate::rpc::CoreCommand;
use crate::Result;
use tracing::debug;

pub async fn load_builtin_libs(ctx: &HandlerContext) -> Result<()> {
    if ctx.store().is_loaded(StoreKeys::LIB_BUILTIN)? {
        debug!("Builtin libraries already cached");
        return Ok(());
    }

    let command = CoreCommand::lib().arg("builtin").json_output();
    let result = call_or_notify(ctx, command, "Could not load built-in libraries").await?;
    ctx.store().set(StoreKeys::LIB_BUILTIN, result)
}

//! Library installation.

use crate::actions::{Completion, CompletionGuard};
use crate::api::HandlerContext;
use crate::config::StoreKeys;
use crate::rpc::{last_output_line, CoreCommand};
use crate::store::prefix_pattern;
use crate::Result;
use std::path::Path;
use tracing::info;

/// Install `lib` into `storage_dir` (global storage when `None`).
///
/// Installed lists are invalidated before the backend is called. `on_end`
/// fires exactly once with the error or the raw backend result.
pub async fn install_library(
    ctx: &HandlerContext,
    storage_dir: Option<&Path>,
    lib: &str,
    on_end: Option<Completion>,
) -> Result<()> {
    let guard = CompletionGuard::new(on_end);

    if let Err(err) = ctx
        .store()
        .delete_matching(&prefix_pattern(StoreKeys::INSTALLED_LIBS_PREFIX))
    {
        guard.finish(Some(&err), None);
        return Err(err);
    }

    let command = CoreCommand::lib().storage(storage_dir).arg("install").arg(lib);

    match command.call_in_subprocess(ctx.rpc()).await {
        Ok(result) => {
            info!("Installed library {}", lib);
            ctx.ui().notify_success(
                "Library has been successfully installed",
                &last_output_line(&result),
            );
            guard.finish(None, Some(&result));
            Ok(())
        }
        Err(err) => {
            ctx.ui().notify_error("Could not install library", &err);
            guard.finish(Some(&err), None);
            Err(err)
        }
    }
}

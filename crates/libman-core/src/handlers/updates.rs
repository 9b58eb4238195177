//! Available library updates, one list per storage.

use crate::api::HandlerContext;
use crate::config::{RouteConfig, StoreKeys};
use crate::rpc::CoreCommand;
use crate::storage::LibraryStorage;
use crate::store::prefix_pattern;
use crate::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// `lib ... update --only-check` for one storage.
pub fn check_updates_command(storage: &LibraryStorage) -> CoreCommand {
    CoreCommand::lib()
        .storage(storage.storage_dir())
        .arg("update")
        .arg("--only-check")
        .json_output()
}

/// Drop every cached update list, reset the badge, and refetch per storage.
///
/// The badge is not recomputed here; only the background check sets it.
pub async fn load_lib_updates(ctx: &Arc<HandlerContext>) -> Result<Vec<JoinHandle<()>>> {
    let removed = ctx
        .store()
        .delete_matching(&prefix_pattern(StoreKeys::LIB_UPDATES_PREFIX))?;
    debug!("Cleared {} cached update lists", removed);
    ctx.ui().set_route_badge(RouteConfig::LIBRARY_UPDATES, 0);

    ctx.storages().ensure_loaded().await?;

    let tasks = ctx
        .storages()
        .storages()?
        .into_iter()
        .map(|storage| {
            let ctx = Arc::clone(ctx);
            tokio::spawn(async move {
                if let Err(e) = fetch_updates(&ctx, &storage).await {
                    debug!("Updates for {} not loaded: {}", storage.initial_path, e);
                }
            })
        })
        .collect();
    Ok(tasks)
}

async fn fetch_updates(ctx: &HandlerContext, storage: &LibraryStorage) -> Result<()> {
    match check_updates_command(storage).call(ctx.rpc()).await {
        Ok(result) => ctx.store().set(&storage.updates_key(), result),
        Err(err) => {
            ctx.ui().notify_error("Could not check library updates", &err);
            Err(err)
        }
    }
}

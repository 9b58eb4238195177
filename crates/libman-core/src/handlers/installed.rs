//! Installed libraries, one list per storage.

use crate::api::HandlerContext;
use crate::rpc::CoreCommand;
use crate::storage::LibraryStorage;
use crate::Result;
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Spawn a fetch for every storage whose list is not cached.
///
/// The returned tasks are independent: one storage failing never affects the
/// others. Dropping the handles detaches them.
pub async fn load_installed_libs(ctx: &Arc<HandlerContext>) -> Result<Vec<JoinHandle<()>>> {
    ctx.storages().ensure_loaded().await?;

    let mut tasks = Vec::new();
    for storage in ctx.storages().storages()? {
        if ctx.store().is_loaded(&storage.installed_key())? {
            continue;
        }
        let ctx = Arc::clone(ctx);
        tasks.push(tokio::spawn(async move {
            if let Err(e) = fetch_installed(&ctx, &storage).await {
                debug!("Installed libraries for {} not loaded: {}", storage.initial_path, e);
            }
        }));
    }
    Ok(tasks)
}

async fn fetch_installed(ctx: &HandlerContext, storage: &LibraryStorage) -> Result<()> {
    let command = CoreCommand::lib()
        .storage(storage.storage_dir())
        .arg("list")
        .json_output();

    let result = match command.call(ctx.rpc()).await {
        Ok(result) => result,
        Err(err) if err.is_storage_missing() => {
            debug!("Storage {} does not exist yet", storage.initial_path);
            json!([])
        }
        Err(err) => {
            ctx.ui().notify_error("Could not load installed libraries", &err);
            return Err(err);
        }
    };

    ctx.store().set(&storage.installed_key(), result)
}

//! Library registry statistics.

use super::call_or_notify;
use crate::api::HandlerContext;
use crate::config::StoreKeys;
use crate::rpc::CoreCommand;
use crate::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Load `libStats` unless it is already cached.
///
/// A successful load schedules a detached reset so the stats are refetched
/// after `stats_reset_delay`.
pub async fn load_stats(ctx: &Arc<HandlerContext>) -> Result<()> {
    if ctx.store().is_loaded(StoreKeys::LIB_STATS)? {
        debug!("Library stats already cached");
        return Ok(());
    }

    let command = CoreCommand::lib().arg("stats").json_output();
    let result = call_or_notify(ctx, command, "Could not load library stats").await?;
    ctx.store().set(StoreKeys::LIB_STATS, result)?;

    schedule_reset(ctx);
    Ok(())
}

fn schedule_reset(ctx: &Arc<HandlerContext>) -> JoinHandle<()> {
    let ctx = Arc::clone(ctx);
    let delay = ctx.config().stats_reset_delay;
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        match ctx.store().clear(StoreKeys::LIB_STATS) {
            Ok(()) => debug!("Library stats expired"),
            Err(e) => warn!("Failed to reset library stats: {}", e),
        }
    })
}

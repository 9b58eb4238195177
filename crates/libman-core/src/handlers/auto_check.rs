//! Periodic background update check.

use super::updates::check_updates_command;
use crate::api::HandlerContext;
use crate::config::{RouteConfig, StateConfig};
use crate::{LibmanError, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Outcome of a background check, mostly for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoCheckOutcome {
    /// The last check is younger than the interval.
    Skipped,
    /// Storages were checked and the badge set to this count.
    Checked(u64),
}

fn last_check(ctx: &HandlerContext) -> Result<Option<DateTime<Utc>>> {
    let Some(raw) = ctx.state().get(StateConfig::LAST_CHECK_UPDATES_KEY)? else {
        return Ok(None);
    };
    let parsed = raw
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis);
    if parsed.is_none() {
        warn!("Ignoring unreadable last update check '{}'", raw);
    }
    Ok(parsed)
}

fn update_count(result: &Value) -> u64 {
    result.as_array().map_or(0, |items| items.len() as u64)
}

/// Check every storage for updates if the interval has elapsed, then set the
/// updates badge to the total.
///
/// Storages are checked one after another. A failing storage is logged and
/// counts as zero. The timestamp is recorded before checking, so a check
/// that fails part-way still waits a full interval.
pub async fn check_updates_in_background(ctx: &HandlerContext) -> Result<AutoCheckOutcome> {
    let now = Utc::now();
    let interval = chrono::Duration::from_std(ctx.config().auto_check_interval).map_err(|e| {
        LibmanError::Config {
            message: format!("Invalid auto check interval: {}", e),
        }
    })?;

    if let Some(last) = last_check(ctx)? {
        if now.signed_duration_since(last) < interval {
            debug!("Last update check at {}, skipping", last);
            return Ok(AutoCheckOutcome::Skipped);
        }
    }

    ctx.state().set(
        StateConfig::LAST_CHECK_UPDATES_KEY,
        &now.timestamp_millis().to_string(),
    )?;

    ctx.storages().ensure_loaded().await?;

    let mut total = 0u64;
    for storage in ctx.storages().storages()? {
        match check_updates_command(&storage).call(ctx.rpc()).await {
            Ok(result) => total += update_count(&result),
            Err(e) => warn!("Update check for {} failed: {}", storage.initial_path, e),
        }
    }

    ctx.ui().set_route_badge(RouteConfig::LIBRARY_UPDATES, total);
    info!("Background update check found {} updates", total);
    Ok(AutoCheckOutcome::Checked(total))
}

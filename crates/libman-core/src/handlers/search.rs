//! Registry search with a bounded result history.

use super::call_or_notify;
use crate::api::HandlerContext;
use crate::config::StoreKeys;
use crate::rpc::CoreCommand;
use crate::store::{find_entry_by_key, push_bounded};
use crate::Result;
use serde_json::{json, Value};
use tracing::debug;

/// Cache key for one page of a query.
pub fn search_cache_key(query: &str, page: u32) -> String {
    format!("{}-{}", query, page)
}

pub async fn load_search_result(ctx: &HandlerContext, query: &str, page: u32) -> Result<()> {
    let key = search_cache_key(query, page);
    let cached = ctx.store().get(StoreKeys::LIB_SEARCH)?;
    if find_entry_by_key(cached.as_ref(), &key).is_some() {
        debug!("Search result '{}' already cached", key);
        return Ok(());
    }

    let mut command = CoreCommand::lib().arg("search");
    if !query.is_empty() {
        command = command.arg(query);
    }
    let command = command.arg("--page").arg(page.to_string()).json_output();

    let result = call_or_notify(ctx, command, "Could not search libraries").await?;

    let limit = ctx.config().max_list_entries;
    let mut entry = Some(json!({ "key": key, "result": result }));
    ctx.store().update(StoreKeys::LIB_SEARCH, &mut |current: Option<&Value>| {
        entry.take().map(|entry| push_bounded(current, entry, limit))
    })?;
    Ok(())
}

//! Registry library details.

use super::{call_or_notify, registry};
use crate::actions::LibraryRef;
use crate::api::HandlerContext;
use crate::config::StoreKeys;
use crate::rpc::CoreCommand;
use crate::store::{find_entry_by_id, push_bounded};
use crate::Result;
use serde_json::Value;
use tracing::debug;

/// Load details for a registry id, or resolve a manifest's platform and
/// framework references.
pub async fn load_library_data(ctx: &HandlerContext, lib: LibraryRef) -> Result<()> {
    match lib {
        LibraryRef::Id(id) => load_registry_library(ctx, id).await,
        LibraryRef::Manifest(manifest) => {
            registry::check_platforms_and_frameworks(ctx, &manifest, true).await
        }
    }
}

async fn load_registry_library(ctx: &HandlerContext, id: u64) -> Result<()> {
    let cached = ctx.store().get(StoreKeys::LIB_DATA)?;
    if find_entry_by_id(cached.as_ref(), id).is_some() {
        debug!("Library #{} already cached", id);
        return Ok(());
    }

    let command = CoreCommand::lib()
        .arg("show")
        .arg(id.to_string())
        .json_output();
    let result = call_or_notify(ctx, command, "Could not load library data").await?;

    let limit = ctx.config().max_list_entries;
    let mut record = Some(result);
    ctx.store().update(StoreKeys::LIB_DATA, &mut |current: Option<&Value>| {
        record.take().map(|record| push_bounded(current, record, limit))
    })?;
    Ok(())
}

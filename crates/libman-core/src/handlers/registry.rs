//! Registry platform and framework lists referenced by manifests.

use crate::api::HandlerContext;
use crate::config::StoreKeys;
use crate::rpc::CoreCommand;
use crate::{LibmanError, Result};
use serde_json::Value;
use tracing::{debug, warn};

struct RegistryList {
    /// Manifest field that references this list.
    field: &'static str,
    slot: &'static str,
    subcommand: &'static str,
    title: &'static str,
}

const REGISTRY_LISTS: [RegistryList; 2] = [
    RegistryList {
        field: "platforms",
        slot: StoreKeys::REGISTRY_PLATFORMS,
        subcommand: "search",
        title: "Could not load registry platforms",
    },
    RegistryList {
        field: "frameworks",
        slot: StoreKeys::REGISTRY_FRAMEWORKS,
        subcommand: "frameworks",
        title: "Could not load registry frameworks",
    },
];

/// Whether a manifest declares a non-empty `field`.
///
/// Accepts either a list or a comma-separated string, with `*` meaning all.
pub fn declares(manifest: &Value, field: &str) -> bool {
    match manifest.get(field) {
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::String(s)) => !s.trim().is_empty(),
        _ => false,
    }
}

/// Load the registry lists that `manifest` references and that are not yet
/// cached.
///
/// Every list is attempted; the first failure is returned. With `silent`
/// failures are logged instead of raising an error toast.
pub async fn check_platforms_and_frameworks(
    ctx: &HandlerContext,
    manifest: &Value,
    silent: bool,
) -> Result<()> {
    let mut first_error: Option<LibmanError> = None;

    for list in &REGISTRY_LISTS {
        if !declares(manifest, list.field) {
            continue;
        }
        if ctx.store().is_loaded(list.slot)? {
            debug!("Registry list '{}' already cached", list.slot);
            continue;
        }

        let command = CoreCommand::platform().arg(list.subcommand).json_output();
        match command.call(ctx.rpc()).await {
            Ok(result) => ctx.store().set(list.slot, result)?,
            Err(err) => {
                if silent {
                    warn!("{}: {}", list.title, err);
                } else {
                    ctx.ui().notify_error(list.title, &err);
                }
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

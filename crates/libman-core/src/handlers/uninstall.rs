//! Uninstall and update of an installed library package.

use crate::actions::{Completion, CompletionGuard};
use crate::api::HandlerContext;
use crate::config::{RouteConfig, StoreKeys};
use crate::rpc::{last_output_line, CoreCommand};
use crate::store::{prefix_pattern, prefixes_pattern, remove_by_pkg_dir};
use crate::Result;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageOperation {
    Uninstall,
    Update,
}

impl PackageOperation {
    fn subcommand(self) -> &'static str {
        match self {
            PackageOperation::Uninstall => "uninstall",
            PackageOperation::Update => "update",
        }
    }

    fn success_title(self) -> &'static str {
        match self {
            PackageOperation::Uninstall => "Library has been successfully uninstalled",
            PackageOperation::Update => "Library has been successfully updated",
        }
    }

    fn error_title(self) -> &'static str {
        match self {
            PackageOperation::Uninstall => "Could not uninstall library",
            PackageOperation::Update => "Could not update library",
        }
    }
}

/// Remove the package from every cached installed and updates list.
///
/// An update also invalidates the installed lists, since versions changed.
fn forget_package(ctx: &HandlerContext, op: PackageOperation, pkg_dir: &str) -> Result<usize> {
    if op == PackageOperation::Update {
        ctx.store()
            .delete_matching(&prefix_pattern(StoreKeys::INSTALLED_LIBS_PREFIX))?;
    }
    let pattern = prefixes_pattern(&[
        StoreKeys::INSTALLED_LIBS_PREFIX,
        StoreKeys::LIB_UPDATES_PREFIX,
    ]);
    ctx.store()
        .update_matching(&pattern, &mut |_: &str, list: &Value| {
            remove_by_pkg_dir(list, pkg_dir)
        })
}

/// Run `lib --storage-dir <dir> uninstall|update <pkg_dir>`.
///
/// When the backend no longer knows the package, the installed lists are
/// stale: they are dropped and the UI is sent back to the installed view
/// instead of raising a toast.
pub async fn uninstall_or_update_library(
    ctx: &HandlerContext,
    op: PackageOperation,
    storage_dir: &Path,
    pkg_dir: &str,
    on_end: Option<Completion>,
) -> Result<()> {
    let guard = CompletionGuard::new(on_end);

    let command = CoreCommand::lib()
        .storage_dir(storage_dir)
        .arg(op.subcommand())
        .arg(pkg_dir);

    match command.call_in_subprocess(ctx.rpc()).await {
        Ok(result) => {
            let pruned = match forget_package(ctx, op, pkg_dir) {
                Ok(pruned) => pruned,
                Err(err) => {
                    guard.finish(Some(&err), None);
                    return Err(err);
                }
            };
            debug!("Pruned {} from {} cached lists", pkg_dir, pruned);
            info!("{} finished for {}", op.subcommand(), pkg_dir);
            ctx.ui().notify_success(op.success_title(), &last_output_line(&result));
            guard.finish(None, Some(&result));
            Ok(())
        }
        Err(err) if err.is_unknown_package() => {
            if let Err(e) = ctx
                .store()
                .delete_matching(&prefix_pattern(StoreKeys::INSTALLED_LIBS_PREFIX))
            {
                warn!("Failed to drop stale installed lists: {}", e);
            }
            if !ctx.ui().navigate(RouteConfig::LIBRARY_INSTALLED, true) {
                debug!("No router attached, staying on current view");
            }
            guard.finish(Some(&err), None);
            Err(err)
        }
        Err(err) => {
            ctx.ui().notify_error(op.error_title(), &err);
            guard.finish(Some(&err), None);
            Err(err)
        }
    }
}

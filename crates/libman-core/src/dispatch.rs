//! Action dispatch and concurrency policies.
//!
//! Each action kind is bound to one policy:
//!
//! - every: each action runs as its own task (library data, install,
//!   uninstall, update).
//! - latest: a new action aborts the previous in-flight one of the same kind
//!   (stats, search).
//! - watcher: one long-lived loop per kind handles triggers one at a time;
//!   triggers arriving while the loop is busy collapse into a single rerun
//!   (builtin, installed, updates).
//!
//! The background update check runs once, after the store reports ready.

use crate::actions::{Action, ActionKind};
use crate::api::HandlerContext;
use crate::handlers::{
    auto_check, builtin, data, install, installed, search, stats, uninstall, updates,
};
use crate::Result;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info, warn};

pub struct Dispatcher {
    ctx: Arc<HandlerContext>,
    builtin: mpsc::Sender<()>,
    installed: mpsc::Sender<()>,
    updates: mpsc::Sender<()>,
    store_ready: watch::Sender<bool>,
    latest: Mutex<HashMap<ActionKind, AbortHandle>>,
    background: Vec<JoinHandle<()>>,
}

impl Dispatcher {
    /// Spawn the watcher loops and the pending background check.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(ctx: Arc<HandlerContext>) -> Self {
        let mut background = Vec::with_capacity(4);

        let (builtin, rx) = mpsc::channel(1);
        background.push(spawn_watcher(
            Arc::clone(&ctx),
            rx,
            ActionKind::LoadBuiltinLibs,
            |ctx| async move { builtin::load_builtin_libs(&ctx).await },
        ));

        let (installed, rx) = mpsc::channel(1);
        background.push(spawn_watcher(
            Arc::clone(&ctx),
            rx,
            ActionKind::LoadInstalledLibs,
            |ctx| async move { installed::load_installed_libs(&ctx).await.map(drop) },
        ));

        let (updates, rx) = mpsc::channel(1);
        background.push(spawn_watcher(
            Arc::clone(&ctx),
            rx,
            ActionKind::LoadLibUpdates,
            |ctx| async move { updates::load_lib_updates(&ctx).await.map(drop) },
        ));

        let (store_ready, mut ready_rx) = watch::channel(false);
        let check_ctx = Arc::clone(&ctx);
        background.push(tokio::spawn(async move {
            if ready_rx.wait_for(|ready| *ready).await.is_err() {
                debug!("Dispatcher stopped before the store was ready");
                return;
            }
            match auto_check::check_updates_in_background(&check_ctx).await {
                Ok(outcome) => debug!("Background update check: {:?}", outcome),
                Err(e) => warn!("Background update check failed: {}", e),
            }
        }));

        info!("Library action dispatcher started");
        Self {
            ctx,
            builtin,
            installed,
            updates,
            store_ready,
            latest: Mutex::new(HashMap::new()),
            background,
        }
    }

    pub fn context(&self) -> &Arc<HandlerContext> {
        &self.ctx
    }

    /// Route an action to its handler.
    ///
    /// Returns the spawned task, or `None` when the action was handed to a
    /// watcher loop.
    pub fn dispatch(&self, action: Action) -> Option<JoinHandle<()>> {
        debug!("Dispatching {:?}", action);
        let kind = action.kind();
        let ctx = Arc::clone(&self.ctx);

        match action {
            Action::LoadStats => {
                Some(self.spawn_latest(kind, async move { stats::load_stats(&ctx).await }))
            }
            Action::LoadSearchResult { query, page } => Some(self.spawn_latest(kind, async move {
                search::load_search_result(&ctx, &query, page).await
            })),
            Action::LoadLibraryData(lib) => Some(spawn_task(kind, async move {
                data::load_library_data(&ctx, lib).await
            })),
            Action::LoadBuiltinLibs => {
                trigger(&self.builtin, kind);
                None
            }
            Action::LoadInstalledLibs => {
                trigger(&self.installed, kind);
                None
            }
            Action::LoadLibUpdates => {
                trigger(&self.updates, kind);
                None
            }
            Action::InstallLibrary {
                storage_dir,
                lib,
                on_end,
            } => Some(spawn_task(kind, async move {
                install::install_library(&ctx, storage_dir.as_deref(), &lib, on_end).await
            })),
            Action::UninstallLibrary {
                storage_dir,
                pkg_dir,
                on_end,
            } => Some(spawn_task(kind, async move {
                uninstall::uninstall_or_update_library(
                    &ctx,
                    uninstall::PackageOperation::Uninstall,
                    &storage_dir,
                    &pkg_dir,
                    on_end,
                )
                .await
            })),
            Action::UpdateLibrary {
                storage_dir,
                pkg_dir,
                on_end,
            } => Some(spawn_task(kind, async move {
                uninstall::uninstall_or_update_library(
                    &ctx,
                    uninstall::PackageOperation::Update,
                    &storage_dir,
                    &pkg_dir,
                    on_end,
                )
                .await
            })),
        }
    }

    /// Signal that persisted state is available. Idempotent.
    pub fn mark_store_ready(&self) {
        if !self.store_ready.send_replace(true) {
            debug!("Store marked ready");
        }
    }

    /// Abort the watcher loops, the background check and latest-policy tasks.
    ///
    /// Tasks spawned under the every policy keep running to completion.
    pub fn shutdown(&self) {
        for task in &self.background {
            task.abort();
        }
        match self.latest.lock() {
            Ok(mut latest) => {
                for (_, handle) in latest.drain() {
                    handle.abort();
                }
            }
            Err(e) => error!("Latest task registry poisoned: {}", e),
        }
    }

    fn spawn_latest<F>(&self, kind: ActionKind, fut: F) -> JoinHandle<()>
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let handle = spawn_task(kind, fut);
        match self.latest.lock() {
            Ok(mut latest) => {
                if let Some(previous) = latest.insert(kind, handle.abort_handle()) {
                    if !previous.is_finished() {
                        debug!("Cancelling previous {:?}", kind);
                    }
                    previous.abort();
                }
            }
            Err(e) => error!("Latest task registry poisoned: {}", e),
        }
        handle
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_task<F>(kind: ActionKind, fut: F) -> JoinHandle<()>
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = fut.await {
            debug!("{:?} finished with error: {}", kind, e);
        }
    })
}

fn trigger(tx: &mpsc::Sender<()>, kind: ActionKind) {
    match tx.try_send(()) {
        Ok(()) => {}
        Err(TrySendError::Full(())) => debug!("{:?} already pending", kind),
        Err(TrySendError::Closed(())) => warn!("{:?} loop is not running", kind),
    }
}

fn spawn_watcher<H, F>(
    ctx: Arc<HandlerContext>,
    mut rx: mpsc::Receiver<()>,
    kind: ActionKind,
    handler: H,
) -> JoinHandle<()>
where
    H: Fn(Arc<HandlerContext>) -> F + Send + 'static,
    F: Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        while rx.recv().await.is_some() {
            if let Err(e) = handler(Arc::clone(&ctx)).await {
                debug!("{:?} iteration failed: {}", kind, e);
            }
        }
        debug!("{:?} loop stopped", kind);
    })
}

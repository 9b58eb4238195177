//! Builder for configuring LibraryManager initialization.

use std::sync::Arc;

use crate::api::HandlerContext;
use crate::config::OrchestratorConfig;
use crate::dispatch::Dispatcher;
use crate::rpc::RpcClient;
use crate::state::{MemoryStateStore, StateStore};
use crate::storage::{StaticStorages, StorageProvider};
use crate::store::{MemoryStore, Store};
use crate::ui::{UiEventLog, UiSink};
use crate::LibraryManager;

/// Builder for configuring LibraryManager initialization.
///
/// Only the backend client is required. Everything else defaults to an
/// in-memory implementation with no storages.
///
/// # Example
///
/// ```rust,ignore
/// use libman_core::{HttpRpcClient, LibraryManager, LibraryStorage, StaticStorages};
///
/// let rpc = Arc::new(HttpRpcClient::new("http://127.0.0.1:8008/jsonrpc")?);
/// let manager = LibraryManager::builder(rpc)
///     .with_storages(Arc::new(StaticStorages::new(vec![LibraryStorage::global("/global")])))
///     .build();
/// manager.mark_store_ready();
/// ```
pub struct LibraryManagerBuilder {
    rpc: Arc<dyn RpcClient>,
    store: Option<Arc<dyn Store>>,
    ui: Option<Arc<dyn UiSink>>,
    state: Option<Arc<dyn StateStore>>,
    storages: Option<Arc<dyn StorageProvider>>,
    config: OrchestratorConfig,
}

impl LibraryManagerBuilder {
    pub fn new(rpc: Arc<dyn RpcClient>) -> Self {
        Self {
            rpc,
            store: None,
            ui: None,
            state: None,
            storages: None,
            config: OrchestratorConfig::default(),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Where toasts, badges and navigation go.
    ///
    /// Default: a `UiEventLog` without a router.
    pub fn with_ui(mut self, ui: Arc<dyn UiSink>) -> Self {
        self.ui = Some(ui);
        self
    }

    /// Persistent state for the last update check.
    ///
    /// Default: in-memory, so the background check runs on every start.
    pub fn with_state_store(mut self, state: Arc<dyn StateStore>) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_storages(mut self, storages: Arc<dyn StorageProvider>) -> Self {
        self.storages = Some(storages);
        self
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the context without starting any tasks.
    pub fn build_context(self) -> Arc<HandlerContext> {
        Arc::new(HandlerContext {
            rpc: self.rpc,
            store: self.store.unwrap_or_else(|| Arc::new(MemoryStore::new())),
            ui: self.ui.unwrap_or_else(|| Arc::new(UiEventLog::new())),
            state: self
                .state
                .unwrap_or_else(|| Arc::new(MemoryStateStore::new())),
            storages: self
                .storages
                .unwrap_or_else(|| Arc::new(StaticStorages::new(Vec::new()))),
            config: self.config,
        })
    }

    /// Build the manager and start its dispatcher.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn build(self) -> LibraryManager {
        let dispatcher = Dispatcher::start(self.build_context());
        LibraryManager { dispatcher }
    }
}

//! Shared state handed to every handler.

use crate::config::OrchestratorConfig;
use crate::rpc::RpcClient;
use crate::state::StateStore;
use crate::storage::StorageProvider;
use crate::store::Store;
use crate::ui::UiSink;
use std::sync::Arc;

/// Collaborators injected into the handlers.
///
/// Cheap to share: handlers take `&Arc<HandlerContext>` and clone the `Arc`
/// into any detached sub-task they spawn.
pub struct HandlerContext {
    pub(crate) rpc: Arc<dyn RpcClient>,
    pub(crate) store: Arc<dyn Store>,
    pub(crate) ui: Arc<dyn UiSink>,
    pub(crate) state: Arc<dyn StateStore>,
    pub(crate) storages: Arc<dyn StorageProvider>,
    pub(crate) config: OrchestratorConfig,
}

impl HandlerContext {
    pub fn rpc(&self) -> &dyn RpcClient {
        self.rpc.as_ref()
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn ui(&self) -> &dyn UiSink {
        self.ui.as_ref()
    }

    pub fn state(&self) -> &dyn StateStore {
        self.state.as_ref()
    }

    pub fn storages(&self) -> &dyn StorageProvider {
        self.storages.as_ref()
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }
}

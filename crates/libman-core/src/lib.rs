//! Libman Core - Library management orchestration for an embedded IDE.
//!
//! UI actions become `core.call` JSON-RPC requests against a backend CLI, and
//! the results land in a normalized client-side store. This crate holds the
//! action dispatcher, the handlers, and the abstractions they are wired to.
//! It has no HTTP layer of its own; see `libman-bridge` for that.
//!
//! # Example
//!
//! ```rust,ignore
//! use libman_core::{Action, HttpRpcClient, LibraryManager};
//!
//! #[tokio::main]
//! async fn main() -> libman_core::Result<()> {
//!     let rpc = Arc::new(HttpRpcClient::new("http://127.0.0.1:8008/jsonrpc")?);
//!     let manager = LibraryManager::builder(rpc).build();
//!
//!     manager.dispatch(Action::LoadStats);
//!     manager.mark_store_ready();
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod rpc;
pub mod state;
pub mod storage;
pub mod store;
pub mod ui;

pub use actions::{Action, ActionKind, ActionRequest, Completion, CompletionGuard, LibraryRef};
pub use api::{HandlerContext, LibraryManagerBuilder};
pub use config::{OrchestratorConfig, RouteConfig, StoreKeys};
pub use error::{LibmanError, Result};
pub use rpc::{HttpRpcClient, RpcClient};
pub use state::{MemoryStateStore, SqliteStateStore, StateStore};
pub use storage::{LibraryStorage, StaticStorages, StorageProvider};
pub use store::{MemoryStore, Store};
pub use ui::{ToastLevel, UiEvent, UiEventLog, UiSink};

use dispatch::Dispatcher;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Entry point for front ends.
///
/// Owns the dispatcher; dropping the manager stops its watcher loops.
pub struct LibraryManager {
    dispatcher: Dispatcher,
}

impl LibraryManager {
    /// Create a builder around a backend client.
    pub fn builder(rpc: Arc<dyn RpcClient>) -> LibraryManagerBuilder {
        LibraryManagerBuilder::new(rpc)
    }

    /// Connect to a JSON-RPC backend over HTTP with default collaborators.
    pub fn connect(endpoint: &str) -> Result<Self> {
        let rpc = Arc::new(HttpRpcClient::new(endpoint)?);
        Ok(Self::builder(rpc).build())
    }

    /// Dispatch a UI action. See [`Dispatcher::dispatch`].
    pub fn dispatch(&self, action: Action) -> Option<JoinHandle<()>> {
        self.dispatcher.dispatch(action)
    }

    /// Signal that persisted UI state is loaded, releasing the background
    /// update check.
    pub fn mark_store_ready(&self) {
        self.dispatcher.mark_store_ready();
    }

    pub fn store(&self) -> &dyn Store {
        self.dispatcher.context().store()
    }

    pub fn context(&self) -> &Arc<HandlerContext> {
        self.dispatcher.context()
    }

    pub fn shutdown(&self) {
        self.dispatcher.shutdown();
    }
}

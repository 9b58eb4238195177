//! Shared fixtures for handler and dispatcher tests.

#![allow(dead_code)]

use async_trait::async_trait;
use libman_core::{
    HandlerContext, LibmanError, LibraryManager, LibraryStorage, MemoryStateStore,
    OrchestratorConfig, Result, RpcClient, StaticStorages, UiEventLog,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One recorded `core.call`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub argv: Vec<String>,
    pub options: Option<Value>,
}

type Responder = Box<dyn Fn(&[String]) -> Result<Value> + Send + Sync>;

/// Backend stand-in that answers from a closure and records every call.
pub struct ScriptedRpc {
    responder: Responder,
    delay: Option<Duration>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedRpc {
    pub fn new(responder: impl Fn(&[String]) -> Result<Value> + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer every call with the same value.
    pub fn always(value: Value) -> Self {
        Self::new(move |_| Ok(value.clone()))
    }

    /// Sleep before answering, so concurrent dispatches overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn argvs(&self) -> Vec<Vec<String>> {
        self.calls().into_iter().map(|call| call.argv).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RpcClient for ScriptedRpc {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        assert_eq!(method, "core.call");
        let argv: Vec<String> = params
            .first()
            .and_then(|argv| argv.as_array())
            .map(|argv| {
                argv.iter()
                    .map(|arg| arg.as_str().unwrap_or_default().to_string())
                    .collect()
            })
            .unwrap_or_default();
        self.calls.lock().unwrap().push(RecordedCall {
            argv: argv.clone(),
            options: params.get(1).cloned(),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(&argv)
    }
}

/// A backend error carrying CLI output in `data`, like the real backend.
pub fn backend_error(data: &str) -> LibmanError {
    LibmanError::Rpc {
        code: -32000,
        message: "Command failed".to_string(),
        data: Some(json!(data)),
    }
}

pub fn argv(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| arg.to_string()).collect()
}

pub fn has(argv: &[String], arg: &str) -> bool {
    argv.iter().any(|a| a == arg)
}

pub fn global_storage() -> LibraryStorage {
    LibraryStorage::global("/global")
}

pub fn project_storage() -> LibraryStorage {
    LibraryStorage::project("/work/blink/.pio/libdeps/uno")
}

/// Everything a test needs to drive handlers directly.
pub struct Harness {
    pub rpc: Arc<ScriptedRpc>,
    pub ui: Arc<UiEventLog>,
    pub state: Arc<MemoryStateStore>,
    pub storages: Arc<StaticStorages>,
    pub ctx: Arc<HandlerContext>,
}

impl Harness {
    pub fn new(rpc: ScriptedRpc) -> Self {
        Self::with_options(rpc, UiEventLog::new(), OrchestratorConfig::default())
    }

    pub fn with_options(rpc: ScriptedRpc, ui: UiEventLog, config: OrchestratorConfig) -> Self {
        let rpc = Arc::new(rpc);
        let ui = Arc::new(ui);
        let state = Arc::new(MemoryStateStore::new());
        let storages = Arc::new(StaticStorages::new(vec![global_storage(), project_storage()]));
        let ctx = LibraryManager::builder(rpc.clone())
            .with_ui(ui.clone())
            .with_state_store(state.clone())
            .with_storages(storages.clone())
            .with_config(config)
            .build_context();
        Self {
            rpc,
            ui,
            state,
            storages,
            ctx,
        }
    }

    pub fn slot(&self, key: &str) -> Option<Value> {
        self.ctx.store().get(key).unwrap()
    }
}

/// Poll until `cond` holds, yielding to spawned tasks in between.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

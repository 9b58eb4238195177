//! Backend CLI argument vectors.
//!
//! Every library operation is a `core.call` whose first param is a CLI-style
//! argv such as `["lib", "--global", "list", "--json-output"]`.

use super::client::RpcClient;
use crate::config::NetworkConfig;
use crate::Result;
use serde_json::{json, Value};
use std::path::Path;

/// Builder for a backend CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreCommand {
    args: Vec<String>,
}

impl CoreCommand {
    /// Start a `lib ...` command.
    pub fn lib() -> Self {
        Self {
            args: vec!["lib".to_string()],
        }
    }

    /// Start a `platform ...` command.
    pub fn platform() -> Self {
        Self {
            args: vec!["platform".to_string()],
        }
    }

    /// Select a storage: `--storage-dir <dir>` when given, `--global` otherwise.
    pub fn storage(self, storage_dir: Option<&Path>) -> Self {
        match storage_dir {
            Some(dir) => self.storage_dir(dir),
            None => self.arg("--global"),
        }
    }

    pub fn storage_dir(self, dir: &Path) -> Self {
        self.arg("--storage-dir")
            .arg(dir.to_string_lossy().into_owned())
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn json_output(self) -> Self {
        self.arg("--json-output")
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn into_args(self) -> Vec<String> {
        self.args
    }

    /// Run the command through `core.call`.
    pub async fn call(self, rpc: &dyn RpcClient) -> Result<Value> {
        core_call(rpc, self.args, None).await
    }

    /// Run the command in a separate backend subprocess.
    ///
    /// Mutating commands use this so their textual output is captured whole.
    pub async fn call_in_subprocess(self, rpc: &dyn RpcClient) -> Result<Value> {
        core_call(rpc, self.args, Some(json!({ "force_subprocess": true }))).await
    }
}

/// Issue a `core.call` with the given argv and optional call options.
pub async fn core_call(
    rpc: &dyn RpcClient,
    argv: Vec<String>,
    options: Option<Value>,
) -> Result<Value> {
    let mut params = vec![json!(argv)];
    if let Some(options) = options {
        params.push(options);
    }
    rpc.call(NetworkConfig::CORE_CALL_METHOD, params).await
}

/// Last non-empty line of a command's textual output.
pub fn last_output_line(result: &Value) -> String {
    let text = match result {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    text.trim()
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}

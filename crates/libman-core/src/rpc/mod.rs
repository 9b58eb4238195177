//! Remote procedure access to the backend process.
//!
//! - **Protocol**: JSON-RPC 2.0 envelopes
//! - **Client**: the `RpcClient` seam and its HTTP implementation
//! - **Command**: CLI argv builders for `core.call`

pub mod client;
pub mod command;
pub mod protocol;

pub use client::{HttpRpcClient, RpcClient};
pub use command::{core_call, last_output_line, CoreCommand};
pub use protocol::{RpcErrorObject, RpcRequest, RpcResponse};

//! Error types for the library manager.
//!
//! Remote failures keep the structured JSON-RPC payload so handlers can
//! distinguish the few backend conditions that are not real errors.

use std::path::PathBuf;
use thiserror::Error;

/// Substring the backend puts in error data when a storage folder is missing.
pub const STORAGE_MISSING_MARKER: &str = "does not exist";

/// Substring the backend puts in error data when a package has no manifest.
pub const UNKNOWN_PACKAGE_MARKER: &str = "Error: Detected unknown package";

/// Main error type for library manager operations.
#[derive(Debug, Error)]
pub enum LibmanError {
    /// Structured error returned by the backend procedure.
    #[error("Remote procedure failed ({code}): {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<serde_json::Value>,
    },

    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid params: {message}")]
    InvalidParams { message: String },

    #[error("Operation cancelled before completion")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

/// Result type alias for library manager operations.
pub type Result<T> = std::result::Result<T, LibmanError>;

impl From<std::io::Error> for LibmanError {
    fn from(err: std::io::Error) -> Self {
        LibmanError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for LibmanError {
    fn from(err: serde_json::Error) -> Self {
        LibmanError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for LibmanError {
    fn from(err: rusqlite::Error) -> Self {
        LibmanError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for LibmanError {
    fn from(err: reqwest::Error) -> Self {
        LibmanError::Transport {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl LibmanError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        LibmanError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Human-readable detail for notifications.
    ///
    /// Backend errors carry the useful text (CLI stderr) in `data`, so that is
    /// preferred over the generic JSON-RPC message.
    pub fn detail(&self) -> String {
        match self {
            LibmanError::Rpc { message, data, .. } => match data {
                Some(serde_json::Value::String(text)) if !text.trim().is_empty() => {
                    text.trim().to_string()
                }
                Some(serde_json::Value::Null) | None => message.clone(),
                Some(other) => other.to_string(),
            },
            other => other.to_string(),
        }
    }

    /// Check whether the remote error payload contains `needle`.
    pub fn data_contains(&self, needle: &str) -> bool {
        match self {
            LibmanError::Rpc {
                data: Some(data), ..
            } => match data {
                serde_json::Value::String(text) => text.contains(needle),
                other => other.to_string().contains(needle),
            },
            _ => false,
        }
    }

    /// The backend reported that a library storage folder does not exist yet.
    pub fn is_storage_missing(&self) -> bool {
        self.data_contains(STORAGE_MISSING_MARKER)
    }

    /// The backend refused to act on a package it cannot identify.
    pub fn is_unknown_package(&self) -> bool {
        self.data_contains(UNKNOWN_PACKAGE_MARKER)
    }

    /// Convert to a JSON-RPC error code.
    ///
    /// Remote errors keep the backend's code. Application-defined codes:
    /// - -32000: transport error
    /// - -32004: cancelled
    /// - -32602: invalid params
    /// - -32603: internal error
    pub fn to_rpc_error_code(&self) -> i64 {
        match self {
            LibmanError::Rpc { code, .. } => *code,
            LibmanError::Transport { .. } => -32000,
            LibmanError::Cancelled => -32004,
            LibmanError::InvalidParams { .. } => -32602,
            _ => -32603,
        }
    }
}

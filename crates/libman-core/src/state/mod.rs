//! Persistent scalar UI state.
//!
//! Survives restarts, unlike the slot store. Used for bookkeeping such as the
//! last background update check.

mod sqlite;

pub use sqlite::SqliteStateStore;

use crate::{LibmanError, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// String key-value persistence.
///
/// Operations are synchronous to match rusqlite's API.
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Non-persistent state store for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().map_err(|_| LibmanError::Store {
            message: "Failed to acquire state lock".to_string(),
        })?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| LibmanError::Store {
            message: "Failed to acquire state lock".to_string(),
        })?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

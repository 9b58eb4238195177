//! Client-side normalized store.
//!
//! Slots are named JSON values. A slot is either unloaded (absent or `null`)
//! or holds a complete result; every write replaces the whole value under the
//! store lock, so readers never observe a partial update.

mod bounded;

pub use bounded::{find_entry_by_key, find_entry_by_id, push_bounded, remove_by_pkg_dir};

use crate::{LibmanError, Result};
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Keyed slot storage consumed by the handlers.
pub trait Store: Send + Sync {
    /// Read a slot. Absent and `null` slots both read as `None`.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Replace a slot wholesale. Writing `null` marks it unloaded.
    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Read-modify-write a slot under one lock.
    ///
    /// `f` receives the current loaded value and returns the replacement, or
    /// `None` to leave the slot untouched. Returns whether a write happened.
    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<&Value>) -> Option<Value>,
    ) -> Result<bool>;

    /// Rewrite every loaded slot whose name matches `pattern`.
    ///
    /// Returns the number of slots written.
    fn update_matching(
        &self,
        pattern: &Regex,
        f: &mut dyn FnMut(&str, &Value) -> Option<Value>,
    ) -> Result<usize>;

    /// Delete every slot whose name matches `pattern`.
    fn delete_matching(&self, pattern: &Regex) -> Result<usize>;

    /// Copy of all slots, sorted by name.
    fn snapshot(&self) -> Result<BTreeMap<String, Value>>;

    /// Whether the slot currently holds a result.
    fn is_loaded(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Mark a slot unloaded.
    fn clear(&self, key: &str) -> Result<()> {
        self.set(key, Value::Null)
    }
}

/// Regex matching every slot whose name starts with `prefix`.
pub fn prefix_pattern(prefix: &str) -> Regex {
    Regex::new(&format!("^{}", regex::escape(prefix))).expect("escaped prefix is a valid regex")
}

/// Regex matching slots starting with any of `prefixes`.
pub fn prefixes_pattern(prefixes: &[&str]) -> Regex {
    let alternatives: Vec<String> = prefixes.iter().map(|p| regex::escape(p)).collect();
    Regex::new(&format!("^(?:{})", alternatives.join("|")))
        .expect("escaped prefixes form a valid regex")
}

/// In-process store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Value>>> {
        self.slots.read().map_err(|_| LibmanError::Store {
            message: "Failed to acquire store read lock".to_string(),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Value>>> {
        self.slots.write().map_err(|_| LibmanError::Store {
            message: "Failed to acquire store write lock".to_string(),
        })
    }
}

fn loaded(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(loaded(self.read()?.get(key)).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.write()?.insert(key.to_string(), value);
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<&Value>) -> Option<Value>,
    ) -> Result<bool> {
        let mut slots = self.write()?;
        match f(loaded(slots.get(key))) {
            Some(next) => {
                slots.insert(key.to_string(), next);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn update_matching(
        &self,
        pattern: &Regex,
        f: &mut dyn FnMut(&str, &Value) -> Option<Value>,
    ) -> Result<usize> {
        let mut slots = self.write()?;
        let mut written = 0;
        for (key, value) in slots.iter_mut() {
            if value.is_null() || !pattern.is_match(key) {
                continue;
            }
            if let Some(next) = f(key, value) {
                *value = next;
                written += 1;
            }
        }
        Ok(written)
    }

    fn delete_matching(&self, pattern: &Regex) -> Result<usize> {
        let mut slots = self.write()?;
        let before = slots.len();
        slots.retain(|key, _| !pattern.is_match(key));
        Ok(before - slots.len())
    }

    fn snapshot(&self) -> Result<BTreeMap<String, Value>> {
        Ok(self
            .read()?
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

//! Library storage locations.
//!
//! A storage is where the backend installs libraries: the global folder or a
//! per-project dependency folder. The set of storages depends on which
//! projects are loaded, so it comes from a `StorageProvider`.

use crate::config::StoreKeys;
use crate::{LibmanError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// One configured library storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryStorage {
    /// Storage folder; `None` selects the global storage.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Folder the storage was configured with, used as its identity.
    pub initial_path: String,
}

impl LibraryStorage {
    pub fn global(initial_path: impl Into<String>) -> Self {
        Self {
            path: None,
            initial_path: initial_path.into(),
        }
    }

    pub fn project(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            initial_path: path.to_string_lossy().into_owned(),
            path: Some(path),
        }
    }

    pub fn storage_dir(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Slot holding this storage's installed libraries.
    pub fn installed_key(&self) -> String {
        StoreKeys::per_storage(StoreKeys::INSTALLED_LIBS_PREFIX, &self.initial_path)
    }

    /// Slot holding this storage's available updates.
    pub fn updates_key(&self) -> String {
        StoreKeys::per_storage(StoreKeys::LIB_UPDATES_PREFIX, &self.initial_path)
    }
}

/// Source of the currently configured storages.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Make sure project metadata is loaded so `storages()` is complete.
    async fn ensure_loaded(&self) -> Result<()>;

    fn storages(&self) -> Result<Vec<LibraryStorage>>;
}

/// Fixed storage list, replaceable at runtime.
#[derive(Debug, Default)]
pub struct StaticStorages {
    storages: RwLock<Vec<LibraryStorage>>,
}

impl StaticStorages {
    pub fn new(storages: Vec<LibraryStorage>) -> Self {
        Self {
            storages: RwLock::new(storages),
        }
    }

    /// Replace the storage list, e.g. after a project was opened.
    pub fn replace(&self, storages: Vec<LibraryStorage>) -> Result<()> {
        let mut current = self.storages.write().map_err(|_| LibmanError::Store {
            message: "Failed to acquire storage list write lock".to_string(),
        })?;
        *current = storages;
        Ok(())
    }
}

#[async_trait]
impl StorageProvider for StaticStorages {
    async fn ensure_loaded(&self) -> Result<()> {
        Ok(())
    }

    fn storages(&self) -> Result<Vec<LibraryStorage>> {
        self.storages
            .read()
            .map(|storages| storages.clone())
            .map_err(|_| LibmanError::Store {
                message: "Failed to acquire storage list read lock".to_string(),
            })
    }
}

//! UI-triggered actions and completion callbacks.

use crate::LibmanError;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// Callback invoked once when an install/uninstall/update finishes.
///
/// Receives the error on failure and the raw backend result on success.
pub type Completion = Box<dyn FnOnce(Option<&LibmanError>, Option<&Value>) + Send + 'static>;

/// Either a registry id or a manifest-like object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LibraryRef {
    Id(u64),
    Manifest(Value),
}

/// An action dispatched by the UI.
pub enum Action {
    LoadStats,
    LoadSearchResult {
        query: String,
        page: u32,
    },
    LoadLibraryData(LibraryRef),
    LoadBuiltinLibs,
    LoadInstalledLibs,
    LoadLibUpdates,
    InstallLibrary {
        storage_dir: Option<PathBuf>,
        lib: String,
        on_end: Option<Completion>,
    },
    UninstallLibrary {
        storage_dir: PathBuf,
        pkg_dir: String,
        on_end: Option<Completion>,
    },
    UpdateLibrary {
        storage_dir: PathBuf,
        pkg_dir: String,
        on_end: Option<Completion>,
    },
}

/// Action type without payload, used to pick the dispatch binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    LoadStats,
    LoadSearchResult,
    LoadLibraryData,
    LoadBuiltinLibs,
    LoadInstalledLibs,
    LoadLibUpdates,
    InstallLibrary,
    UninstallLibrary,
    UpdateLibrary,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::LoadStats => ActionKind::LoadStats,
            Action::LoadSearchResult { .. } => ActionKind::LoadSearchResult,
            Action::LoadLibraryData(_) => ActionKind::LoadLibraryData,
            Action::LoadBuiltinLibs => ActionKind::LoadBuiltinLibs,
            Action::LoadInstalledLibs => ActionKind::LoadInstalledLibs,
            Action::LoadLibUpdates => ActionKind::LoadLibUpdates,
            Action::InstallLibrary { .. } => ActionKind::InstallLibrary,
            Action::UninstallLibrary { .. } => ActionKind::UninstallLibrary,
            Action::UpdateLibrary { .. } => ActionKind::UpdateLibrary,
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::LoadSearchResult { query, page } => f
                .debug_struct("LoadSearchResult")
                .field("query", query)
                .field("page", page)
                .finish(),
            Action::LoadLibraryData(lib) => f.debug_tuple("LoadLibraryData").field(lib).finish(),
            Action::InstallLibrary {
                storage_dir, lib, ..
            } => f
                .debug_struct("InstallLibrary")
                .field("storage_dir", storage_dir)
                .field("lib", lib)
                .finish_non_exhaustive(),
            Action::UninstallLibrary {
                storage_dir,
                pkg_dir,
                ..
            }
            | Action::UpdateLibrary {
                storage_dir,
                pkg_dir,
                ..
            } => f
                .debug_struct(if matches!(self, Action::UpdateLibrary { .. }) {
                    "UpdateLibrary"
                } else {
                    "UninstallLibrary"
                })
                .field("storage_dir", storage_dir)
                .field("pkg_dir", pkg_dir)
                .finish_non_exhaustive(),
            other => write!(f, "{:?}", other.kind()),
        }
    }
}

/// Serializable form of `Action`, as sent by a front end.
///
/// Completion callbacks cannot cross the wire; they are attached with
/// `into_action`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionRequest {
    LoadStats,
    LoadSearchResult {
        #[serde(default)]
        query: String,
        #[serde(default = "first_page")]
        page: u32,
    },
    LoadLibraryData {
        lib: LibraryRef,
    },
    LoadBuiltinLibs,
    LoadInstalledLibs,
    LoadLibUpdates,
    InstallLibrary {
        #[serde(default, alias = "storageDir")]
        storage_dir: Option<PathBuf>,
        lib: String,
    },
    UninstallLibrary {
        #[serde(alias = "storageDir")]
        storage_dir: PathBuf,
        #[serde(alias = "pkgDir")]
        pkg_dir: String,
    },
    UpdateLibrary {
        #[serde(alias = "storageDir")]
        storage_dir: PathBuf,
        #[serde(alias = "pkgDir")]
        pkg_dir: String,
    },
}

fn first_page() -> u32 {
    1
}

impl ActionRequest {
    /// Whether the action reports completion through a callback.
    pub fn takes_completion(&self) -> bool {
        matches!(
            self,
            ActionRequest::InstallLibrary { .. }
                | ActionRequest::UninstallLibrary { .. }
                | ActionRequest::UpdateLibrary { .. }
        )
    }

    /// Build the dispatchable action. `on_end` is ignored by actions that
    /// take no completion callback.
    pub fn into_action(self, on_end: Option<Completion>) -> Action {
        match self {
            ActionRequest::LoadStats => Action::LoadStats,
            ActionRequest::LoadSearchResult { query, page } => {
                Action::LoadSearchResult { query, page }
            }
            ActionRequest::LoadLibraryData { lib } => Action::LoadLibraryData(lib),
            ActionRequest::LoadBuiltinLibs => Action::LoadBuiltinLibs,
            ActionRequest::LoadInstalledLibs => Action::LoadInstalledLibs,
            ActionRequest::LoadLibUpdates => Action::LoadLibUpdates,
            ActionRequest::InstallLibrary { storage_dir, lib } => Action::InstallLibrary {
                storage_dir,
                lib,
                on_end,
            },
            ActionRequest::UninstallLibrary {
                storage_dir,
                pkg_dir,
            } => Action::UninstallLibrary {
                storage_dir,
                pkg_dir,
                on_end,
            },
            ActionRequest::UpdateLibrary {
                storage_dir,
                pkg_dir,
            } => Action::UpdateLibrary {
                storage_dir,
                pkg_dir,
                on_end,
            },
        }
    }
}

/// Fires a completion callback exactly once.
///
/// `finish` consumes the guard. If the guard is dropped unfinished (the task
/// was aborted or panicked) the callback receives `LibmanError::Cancelled`.
pub struct CompletionGuard {
    on_end: Option<Completion>,
}

impl CompletionGuard {
    pub fn new(on_end: Option<Completion>) -> Self {
        Self { on_end }
    }

    pub fn finish(mut self, error: Option<&LibmanError>, result: Option<&Value>) {
        if let Some(on_end) = self.on_end.take() {
            on_end(error, result);
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Some(on_end) = self.on_end.take() {
            on_end(Some(&LibmanError::Cancelled), None);
        }
    }
}

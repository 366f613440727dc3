// SPDX-License-Identifier: MPL-2.0
//! Process-wide state shared with the rest of the application.
//!
//! Every slot is written at most once during startup and read freely
//! afterwards. A second write is rejected with [`StateError::AlreadySet`]
//! instead of silently replacing what earlier readers may already hold.

use crate::nls::MessageCatalog;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("process state slot `{0}` is already set")]
    AlreadySet(&'static str),
}

/// Write-once process state slots.
///
/// Shared as `Arc<ProcessState>` between the bootstrap and whatever it loads.
#[derive(Debug, Default)]
pub struct ProcessState {
    product: OnceLock<serde_json::Value>,
    package: OnceLock<serde_json::Value>,
    file_root: OnceLock<PathBuf>,
    nls_language: OnceLock<String>,
    nls_messages: OnceLock<Arc<MessageCatalog>>,
}

fn set_once<T>(slot: &OnceLock<T>, name: &'static str, value: T) -> Result<(), StateError> {
    slot.set(value).map_err(|_| StateError::AlreadySet(name))
}

impl ProcessState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Product descriptor, provided by the embedding application.
    pub fn set_product(&self, product: serde_json::Value) -> Result<(), StateError> {
        set_once(&self.product, "product", product)
    }

    pub fn product(&self) -> Option<&serde_json::Value> {
        self.product.get()
    }

    /// Package descriptor, provided by the embedding application.
    pub fn set_package(&self, package: serde_json::Value) -> Result<(), StateError> {
        set_once(&self.package, "package", package)
    }

    pub fn package(&self) -> Option<&serde_json::Value> {
        self.package.get()
    }

    /// Root directory of all bundled resources.
    pub fn set_file_root(&self, root: PathBuf) -> Result<(), StateError> {
        set_once(&self.file_root, "file_root", root)
    }

    pub fn file_root(&self) -> Option<&Path> {
        self.file_root.get().map(PathBuf::as_path)
    }

    pub fn set_nls_language(&self, language: String) -> Result<(), StateError> {
        set_once(&self.nls_language, "nls_language", language)
    }

    /// Resolved UI language tag, when the localization descriptor named one.
    pub fn nls_language(&self) -> Option<&str> {
        self.nls_language.get().map(String::as_str)
    }

    pub fn set_nls_messages(&self, catalog: MessageCatalog) -> Result<(), StateError> {
        set_once(&self.nls_messages, "nls_messages", Arc::new(catalog))
    }

    /// Active message catalog, if one was loaded.
    pub fn nls_messages(&self) -> Option<Arc<MessageCatalog>> {
        self.nls_messages.get().cloned()
    }
}

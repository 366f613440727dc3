// SPDX-License-Identifier: MPL-2.0
//! Entry modules and how they are loaded.
//!
//! An entry module named `workbench` lives next to the bootstrap as
//! `./workbench.<ext>` (the extension comes from the settings, `toml` by
//! default). File modules are TOML documents whose top-level table is the
//! module's exported surface. A module may list the modules it depends on
//! under `imports`; those are resolved (not loaded) through the same
//! [`ResolverChain`](crate::resolve::ResolverChain) as the entry itself.
//!
//! Builtin modules are tables registered in-process on the loader.

use crate::resolve::{ModuleFormat, Resolution};
use std::collections::HashMap;
use std::future::Future;
use std::io;
use thiserror::Error;

/// Exported surface of a module.
pub type ModuleExports = toml::Table;

/// Key under which a module lists its own imports.
pub const IMPORTS_KEY: &str = "imports";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("cannot find module '{0}'")]
    NotFound(String),

    #[error("failed to read module '{url}': {message}")]
    Read { url: String, message: String },

    #[error("failed to parse module '{url}': {message}")]
    Parse { url: String, message: String },

    #[error("unknown builtin module '{0}'")]
    UnknownBuiltin(String),
}

/// Relative specifier of a sibling module, e.g. `./workbench.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleSpecifier(String);

impl ModuleSpecifier {
    #[must_use]
    pub fn sibling(name: &str, extension: &str) -> Self {
        Self(format!("./{name}.{extension}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModuleSpecifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A successfully imported module.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedModule {
    /// Name the module was requested by.
    pub name: String,
    pub resolution: Resolution,
    pub exports: ModuleExports,
    /// Where each declared import resolved to, in declaration order.
    pub imports: Vec<Resolution>,
}

impl LoadedModule {
    /// A single exported value.
    #[must_use]
    pub fn export(&self, key: &str) -> Option<&toml::Value> {
        self.exports.get(key)
    }
}

/// Specifiers a module declares under [`IMPORTS_KEY`]. Non-string entries are skipped.
pub fn declared_imports(exports: &ModuleExports) -> impl Iterator<Item = &str> {
    exports
        .get(IMPORTS_KEY)
        .and_then(toml::Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(toml::Value::as_str)
}

/// Turns a resolved module into its exported surface.
pub trait ModuleLoader: Send + Sync {
    fn import(
        &self,
        resolution: &Resolution,
    ) -> impl Future<Output = Result<ModuleExports, ImportError>> + Send;
}

/// Loads file modules from disk and serves registered builtins.
#[derive(Debug, Clone, Default)]
pub struct FileModuleLoader {
    builtins: HashMap<String, ModuleExports>,
}

impl FileModuleLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a builtin module.
    #[must_use]
    pub fn with_builtin(mut self, name: impl Into<String>, exports: ModuleExports) -> Self {
        self.builtins.insert(name.into(), exports);
        self
    }

    fn import_builtin(&self, resolution: &Resolution) -> Result<ModuleExports, ImportError> {
        let name = resolution.builtin_name().unwrap_or(&resolution.url);
        self.builtins
            .get(name)
            .cloned()
            .ok_or_else(|| ImportError::UnknownBuiltin(name.to_string()))
    }

    async fn import_file(&self, resolution: &Resolution) -> Result<ModuleExports, ImportError> {
        let content = tokio::fs::read_to_string(&resolution.url)
            .await
            .map_err(|err| match err.kind() {
                io::ErrorKind::NotFound => ImportError::NotFound(resolution.url.clone()),
                _ => ImportError::Read {
                    url: resolution.url.clone(),
                    message: err.to_string(),
                },
            })?;

        toml::from_str(&content).map_err(|err| ImportError::Parse {
            url: resolution.url.clone(),
            message: err.to_string(),
        })
    }
}

impl ModuleLoader for FileModuleLoader {
    async fn import(&self, resolution: &Resolution) -> Result<ModuleExports, ImportError> {
        match resolution.format {
            ModuleFormat::Builtin => self.import_builtin(resolution),
            ModuleFormat::File => self.import_file(resolution).await,
        }
    }
}

// SPDX-License-Identifier: MPL-2.0
//! Bootstrap settings, loaded from a `bootstrap.toml` file.
//!
//! # Configuration Sections
//!
//! - `[modules]` - Entry module naming convention
//! - `[logging]` - Default log filter
//!
//! Localization is deliberately absent: it is driven by the environment
//! descriptor the host shell exports (see [`crate::env`]).
//!
//! # Examples
//!
//! ```no_run
//! use host_bootstrap::config;
//!
//! let (settings, warning) = config::load();
//! if let Some(warning) = warning {
//!     eprintln!("{warning}");
//! }
//! assert!(!settings.module_extension().is_empty());
//! ```

pub mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Entry module settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleSettings {
    /// Extension appended to entry module names, without the leading dot.
    #[serde(default = "default_extension", skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl Default for ModuleSettings {
    fn default() -> Self {
        Self {
            extension: default_extension(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive, used when `RUST_LOG` is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Bootstrap settings with logical sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Settings {
    #[serde(default)]
    pub modules: ModuleSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Effective module extension, stripped of any leading dot.
    #[must_use]
    pub fn module_extension(&self) -> &str {
        self.modules
            .extension
            .as_deref()
            .map(|ext| ext.trim_start_matches('.'))
            .filter(|ext| !ext.is_empty())
            .unwrap_or(DEFAULT_MODULE_EXTENSION)
    }

    /// Effective log filter.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.logging
            .filter
            .as_deref()
            .filter(|filter| !filter.is_empty())
            .unwrap_or(DEFAULT_LOG_FILTER)
    }
}

fn default_extension() -> Option<String> {
    Some(DEFAULT_MODULE_EXTENSION.to_string())
}

fn get_config_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    paths::get_app_config_dir_with_override(base_dir).map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

/// Loads the settings from the default path.
///
/// Returns a tuple of (settings, optional_warning). A missing file is not an
/// error; an unreadable or invalid one yields defaults plus a warning.
pub fn load() -> (Settings, Option<String>) {
    load_with_override(None)
}

/// Loads the settings from a custom directory.
pub fn load_with_override(base_dir: Option<PathBuf>) -> (Settings, Option<String>) {
    if let Some(path) = get_config_path_with_override(base_dir) {
        if path.exists() {
            return match load_from_path(&path) {
                Ok(settings) => (settings, None),
                Err(err) => (
                    Settings::default(),
                    Some(format!(
                        "ignoring settings file {}: {err}",
                        path.display()
                    )),
                ),
            };
        }
    }
    (Settings::default(), None)
}

/// Loads settings from a specific path.
pub fn load_from_path(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)?;
    let settings: Settings = toml::from_str(&content)?;
    Ok(settings)
}

/// Saves settings to a specific path, creating parent directories.
pub fn save_to_path(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(settings).map_err(Error::from)?;
    fs::write(path, content)?;
    Ok(())
}

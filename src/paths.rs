// SPDX-License-Identifier: MPL-2.0
//! Centralized path management for the bootstrap.
//!
//! Two directories matter at startup: the **file root**, against which sibling
//! entry modules are resolved, and the **config directory**, which holds
//! `bootstrap.toml`.
//!
//! # Path Resolution Order
//!
//! Both are resolved in the following priority order:
//! 1. **Explicit override** - parameter to `_with_override()` functions (for tests)
//! 2. **CLI arguments** (`--root`, `--config-dir`) - set via [`init_cli_overrides`]
//! 3. **Environment variables** (`HOST_FILE_ROOT`, `HOST_CONFIG_DIR`)
//! 4. **Default** - the executable's own directory for the file root, the
//!    platform config directory (via `dirs`) for the config directory

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Application name used for directory naming.
const APP_NAME: &str = "HostBootstrap";

/// Environment variable to override the file root.
pub const ENV_FILE_ROOT: &str = "HOST_FILE_ROOT";

/// Environment variable to override the config directory.
pub const ENV_CONFIG_DIR: &str = "HOST_CONFIG_DIR";

/// Global CLI override for the file root (set once at startup).
static CLI_FILE_ROOT: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Global CLI override for the config directory (set once at startup).
static CLI_CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Initializes CLI overrides for the file root and config directory.
///
/// Call once at startup, before any path resolution.
///
/// # Errors
///
/// Returns [`Error::Config`] if the overrides were already initialized.
pub fn init_cli_overrides(file_root: Option<String>, config_dir: Option<String>) -> Result<()> {
    CLI_FILE_ROOT
        .set(file_root.map(PathBuf::from))
        .map_err(|_| Error::Config("CLI file root override already initialized".into()))?;
    CLI_CONFIG_DIR
        .set(config_dir.map(PathBuf::from))
        .map_err(|_| Error::Config("CLI config dir override already initialized".into()))?;
    Ok(())
}

fn get_cli_file_root() -> Option<PathBuf> {
    CLI_FILE_ROOT.get().and_then(Clone::clone)
}

fn get_cli_config_dir() -> Option<PathBuf> {
    CLI_CONFIG_DIR.get().and_then(Clone::clone)
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Returns the directory entry modules are resolved against.
///
/// Returns `None` only if the running executable's location is unknown and
/// no override is configured.
pub fn get_file_root() -> Option<PathBuf> {
    get_file_root_with_override(None)
}

/// Returns the file root with an optional override.
pub fn get_file_root_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path);
    }

    if let Some(path) = get_cli_file_root() {
        return Some(path);
    }

    if let Some(path) = env_path(ENV_FILE_ROOT) {
        return Some(path);
    }

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// Returns the config directory path.
///
/// - Linux: `~/.config/HostBootstrap/`
/// - macOS: `~/Library/Application Support/HostBootstrap/`
/// - Windows: `C:\Users\<User>\AppData\Roaming\HostBootstrap\`
pub fn get_app_config_dir() -> Option<PathBuf> {
    get_app_config_dir_with_override(None)
}

/// Returns the config directory path with an optional override.
pub fn get_app_config_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path);
    }

    if let Some(path) = get_cli_config_dir() {
        return Some(path);
    }

    if let Some(path) = env_path(ENV_CONFIG_DIR) {
        return Some(path);
    }

    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to prevent parallel tests from interfering with each other's env vars
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn app_config_dir_contains_app_name() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::remove_var(ENV_CONFIG_DIR);

        if let Some(path) = get_app_config_dir() {
            assert!(
                path.to_string_lossy().contains(APP_NAME),
                "config dir should contain app name"
            );
        }
    }

    #[test]
    fn override_path_takes_precedence_for_config_dir() {
        let override_path = PathBuf::from("/custom/config/path");
        let result = get_app_config_dir_with_override(Some(override_path.clone()));
        assert_eq!(result, Some(override_path));
    }

    #[test]
    fn override_path_takes_precedence_for_file_root() {
        let override_path = PathBuf::from("/custom/root");
        let result = get_file_root_with_override(Some(override_path.clone()));
        assert_eq!(result, Some(override_path));
    }

    #[test]
    fn env_var_overrides_default_file_root() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::set_var(ENV_FILE_ROOT, "/env/root");

        let result = get_file_root();
        std::env::remove_var(ENV_FILE_ROOT);

        assert_eq!(result, Some(PathBuf::from("/env/root")));
    }

    #[test]
    fn empty_env_var_falls_back_to_executable_dir() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::set_var(ENV_FILE_ROOT, "");

        let result = get_file_root();
        std::env::remove_var(ENV_FILE_ROOT);

        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        assert_eq!(result, exe_dir);
    }

    #[test]
    fn env_var_overrides_default_config_dir() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::set_var(ENV_CONFIG_DIR, "/env/config");

        let result = get_app_config_dir();
        std::env::remove_var(ENV_CONFIG_DIR);

        assert_eq!(result, Some(PathBuf::from("/env/config")));
    }
}

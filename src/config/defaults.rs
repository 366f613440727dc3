// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for bootstrap settings.

/// Settings file name inside the config directory.
pub const CONFIG_FILE: &str = "bootstrap.toml";

/// File extension appended to entry module names (`entry` -> `./entry.toml`).
pub const DEFAULT_MODULE_EXTENSION: &str = "toml";

/// Log filter used when neither `RUST_LOG` nor the settings file provide one.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Capacity of the performance mark buffer.
pub const DEFAULT_MARK_CAPACITY: usize = 64;

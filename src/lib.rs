// SPDX-License-Identifier: MPL-2.0
//! `host_bootstrap` is the startup shim of a desktop application host.
//!
//! Before the application's real entry module runs, it resolves the
//! localization descriptor exported by the host shell, loads the matching
//! message catalog, redirects filesystem builtins when running inside the
//! embedded host runtime, and only then imports the entry module.
//!
//! The pieces, in dependency order:
//!
//! - [`resolve`]: resolution hooks, including the embedded-runtime redirect
//! - [`nls`]: memoized localization setup with catalog fallback
//! - [`bootstrap`]: sequencing of localization and entry import

pub mod bootstrap;
pub mod config;
pub mod env;
pub mod error;
pub mod logging;
pub mod module;
pub mod nls;
pub mod paths;
pub mod perf;
pub mod resolve;
pub mod state;

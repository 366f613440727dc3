// SPDX-License-Identifier: MPL-2.0
//! Diagnostic output.
//!
//! The library only emits `tracing` events. Binaries install a subscriber
//! once with [`init_tracing`], which writes to stderr so stdout stays free
//! for whatever the entry module prints.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: Once = Once::new();

/// Installs the global subscriber. Safe to call multiple times.
///
/// `RUST_LOG` wins when set; otherwise `fallback_filter` is used, and if that
/// does not parse, `warn`.
pub fn init_tracing(fallback_filter: &str) {
    TRACING_INIT.call_once(|| {
        let filter = build_filter(std::env::var("RUST_LOG").ok().as_deref(), fallback_filter);
        // Another subscriber may already be installed by the embedding application.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .try_init();
    });
}

fn build_filter(env_filter: Option<&str>, fallback_filter: &str) -> EnvFilter {
    env_filter
        .filter(|directives| !directives.is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(fallback_filter).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

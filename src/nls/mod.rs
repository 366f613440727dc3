// SPDX-License-Identifier: MPL-2.0
//! Localization (NLS) setup.
//!
//! The host shell describes the active language in a JSON environment
//! variable. At startup the bootstrap parses that descriptor, loads the
//! matching message catalog and publishes both into [`ProcessState`].
//!
//! # Fallback order
//!
//! 1. Language pack catalog (`languagePack.messagesFile`)
//! 2. Default catalog (`defaultMessagesFile`), when the first is absent or
//!    unusable and it is a different file
//! 3. No catalog at all
//!
//! When the language pack catalog is unusable, a sentinel is written to the
//! pack's corruption marker so the next startup rebuilds the pack cache.
//!
//! Nothing in here fails the startup: every error is logged and recovered.
//!
//! [`ProcessState`]: crate::state::ProcessState

mod catalog;
mod config;
mod fs;
mod resolver;

pub use catalog::MessageCatalog;
pub use config::{LanguagePack, NlsConfiguration};
pub use fs::{CatalogFs, TokioFs};
pub use resolver::LocalizationResolver;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Content written to the corruption marker file.
pub const CORRUPT_MARKER_CONTENT: &str = "corrupted";

/// Why a catalog file could not be used.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Parse(#[from] serde_json::Error),
}

/// Localization failures. Logged by the resolver, never returned from it.
#[derive(Debug, Error)]
pub enum NlsError {
    #[error("error reading localization config from environment: {0}")]
    ConfigParse(#[source] serde_json::Error),

    #[error("error reading NLS messages file {}: {source}", .path.display())]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: CatalogError,
    },

    #[error("error writing corrupted NLS marker file {}: {source}", .path.display())]
    MarkerWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error reading default NLS messages file {}: {source}", .path.display())]
    FallbackRead {
        path: PathBuf,
        #[source]
        source: CatalogError,
    },
}

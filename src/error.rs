// SPDX-License-Identifier: MPL-2.0
//! Crate-wide error type.
//!
//! Localization failures never reach this type: the resolver recovers from
//! them locally and only logs [`crate::nls::NlsError`]. What remains here is
//! what a caller can act on (settings I/O, write-once state violations and
//! entry-module import failures).

use crate::module::ImportError;
use crate::state::StateError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("I/O Error: {0}")]
    Io(String),

    #[error("Config Error: {0}")]
    Config(String),

    #[error("State Error: {0}")]
    State(#[from] StateError),

    #[error("Import Error: {0}")]
    Import(#[from] ImportError),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

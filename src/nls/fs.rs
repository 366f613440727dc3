// SPDX-License-Identifier: MPL-2.0
//! File access used by the localization resolver.
//!
//! Kept behind a trait so tests can observe (and count) the resolver's reads
//! and writes without a real language pack on disk.

use std::future::Future;
use std::io;
use std::path::Path;

pub trait CatalogFs: Send + Sync {
    /// Reads a whole file.
    fn read(&self, path: &Path) -> impl Future<Output = io::Result<Vec<u8>>> + Send;

    /// Creates or truncates `path` and writes `contents` to it.
    fn write(&self, path: &Path, contents: &[u8]) -> impl Future<Output = io::Result<()>> + Send;
}

/// [`CatalogFs`] backed by `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

impl CatalogFs for TokioFs {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        tokio::fs::write(path, contents).await
    }
}

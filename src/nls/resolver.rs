// SPDX-License-Identifier: MPL-2.0
//! Memoized localization setup.

use super::{
    CatalogError, CatalogFs, MessageCatalog, NlsConfiguration, NlsError, TokioFs,
    CORRUPT_MARKER_CONTENT,
};
use crate::env::BootstrapEnv;
use crate::perf::{marks, PerformanceMarks};
use crate::state::ProcessState;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Runs localization setup at most once and hands every caller the same
/// settled result.
///
/// The result is the parsed descriptor, or `None` when localization was
/// skipped (no descriptor, unparsable descriptor, no messages file, or
/// development mode). Resolution never fails.
#[derive(Debug)]
pub struct LocalizationResolver<F = TokioFs> {
    raw_config: Option<String>,
    dev_mode: bool,
    state: Arc<ProcessState>,
    marks: Arc<PerformanceMarks>,
    fs: F,
    settled: OnceCell<Option<NlsConfiguration>>,
}

impl<F: CatalogFs> LocalizationResolver<F> {
    pub fn new(
        env: &BootstrapEnv,
        state: Arc<ProcessState>,
        marks: Arc<PerformanceMarks>,
        fs: F,
    ) -> Self {
        Self {
            raw_config: env.nls_config.clone(),
            dev_mode: env.dev_mode,
            state,
            marks,
            fs,
            settled: OnceCell::new(),
        }
    }

    /// Localization result, running setup on the first call only.
    ///
    /// Concurrent callers all wait on the single in-flight setup.
    pub async fn resolve(&self) -> Option<&NlsConfiguration> {
        self.settled.get_or_init(|| self.setup()).await.as_ref()
    }

    /// Whether setup has completed.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.settled.initialized()
    }

    async fn setup(&self) -> Option<NlsConfiguration> {
        self.marks.mark(marks::WILL_LOAD_NLS);

        let config = self.parse_config();
        let messages_file = config
            .as_ref()
            .and_then(NlsConfiguration::messages_file)
            .map(Path::to_path_buf);

        if self.dev_mode {
            tracing::debug!("development mode, skipping message catalog");
            return None;
        }
        let Some(messages_file) = messages_file else {
            tracing::debug!("no message catalog configured");
            return None;
        };

        match self.read_catalog(&messages_file).await {
            Ok(catalog) => self.install(catalog, &messages_file),
            Err(source) => {
                let err = NlsError::CatalogRead {
                    path: messages_file.clone(),
                    source,
                };
                tracing::error!("{err}");

                if let Some(marker) = config.as_ref().and_then(NlsConfiguration::corrupt_marker_file)
                {
                    self.mark_corrupt(marker).await;
                }

                if let Some(default_file) = config
                    .as_ref()
                    .and_then(NlsConfiguration::default_messages_file)
                    .filter(|default_file| *default_file != messages_file.as_path())
                {
                    self.load_fallback(default_file).await;
                }
            }
        }

        self.marks.mark(marks::DID_LOAD_NLS);
        config
    }

    /// Parses the descriptor and publishes its language tag.
    fn parse_config(&self) -> Option<NlsConfiguration> {
        let raw = self.raw_config.as_deref()?;
        match NlsConfiguration::from_json(raw) {
            Ok(config) => {
                if let Some(language) = &config.resolved_language {
                    match config.language_identifier() {
                        Some(tag) => tracing::debug!(language = %tag, "resolved language"),
                        None => tracing::warn!("'{language}' is not a well-formed language tag"),
                    }
                    if let Err(err) = self.state.set_nls_language(language.clone()) {
                        tracing::warn!("{err}");
                    }
                }
                Some(config)
            }
            Err(source) => {
                tracing::error!("{}", NlsError::ConfigParse(source));
                None
            }
        }
    }

    async fn read_catalog(&self, path: &Path) -> Result<MessageCatalog, CatalogError> {
        let bytes = self.fs.read(path).await?;
        Ok(MessageCatalog::from_json_slice(&bytes)?)
    }

    fn install(&self, catalog: MessageCatalog, path: &Path) {
        tracing::debug!(path = %path.display(), messages = catalog.len(), "loaded message catalog");
        if let Err(err) = self.state.set_nls_messages(catalog) {
            tracing::warn!("{err}");
        }
    }

    /// Best effort: asks the next startup to rebuild the language pack cache.
    async fn mark_corrupt(&self, marker: &Path) {
        if let Err(source) = self
            .fs
            .write(marker, CORRUPT_MARKER_CONTENT.as_bytes())
            .await
        {
            let err = NlsError::MarkerWrite {
                path: marker.to_path_buf(),
                source,
            };
            tracing::error!("{err}");
        }
    }

    async fn load_fallback(&self, default_file: &Path) {
        match self.read_catalog(default_file).await {
            Ok(catalog) => self.install(catalog, default_file),
            Err(source) => {
                let err = NlsError::FallbackRead {
                    path: PathBuf::from(default_file),
                    source,
                };
                tracing::error!("{err}");
            }
        }
    }
}

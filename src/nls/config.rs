// SPDX-License-Identifier: MPL-2.0
//! Localization descriptor exported by the host shell.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use unic_langid::LanguageIdentifier;

/// A field of the wrong type is dropped instead of rejecting the whole
/// descriptor.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Empty path strings count as unset.
fn non_empty(path: Option<&PathBuf>) -> Option<&Path> {
    path.map(PathBuf::as_path).filter(|path| !path.as_os_str().is_empty())
}

/// Installed language pack, as described by the host shell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguagePack {
    /// Per-extension translation index. Carried for the application, unused here.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub translations_config_file: Option<PathBuf>,

    /// Translated message catalog for the resolved language.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub messages_file: Option<PathBuf>,

    /// Where to drop the corruption sentinel if `messages_file` is unusable.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub corrupt_marker_file: Option<PathBuf>,
}

/// Parsed localization descriptor. Immutable once parsed.
///
/// Every field is optional; unknown fields are ignored, and so is a known
/// field holding a value of the wrong type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NlsConfiguration {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub user_locale: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub os_locale: Option<String>,

    /// Language the UI should use, e.g. `"fr"` or `"zh-cn"`.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub resolved_language: Option<String>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub language_pack: Option<LanguagePack>,

    /// Built-in (untranslated) catalog shipped with the application.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub default_messages_file: Option<PathBuf>,
}

impl NlsConfiguration {
    /// Parses the JSON payload of the localization environment variable.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// The catalog to load: the language pack's messages if present,
    /// otherwise the default messages.
    #[must_use]
    pub fn messages_file(&self) -> Option<&Path> {
        self.language_pack
            .as_ref()
            .and_then(|pack| non_empty(pack.messages_file.as_ref()))
            .or_else(|| self.default_messages_file())
    }

    #[must_use]
    pub fn corrupt_marker_file(&self) -> Option<&Path> {
        self.language_pack
            .as_ref()
            .and_then(|pack| non_empty(pack.corrupt_marker_file.as_ref()))
    }

    #[must_use]
    pub fn default_messages_file(&self) -> Option<&Path> {
        non_empty(self.default_messages_file.as_ref())
    }

    /// `resolved_language` as a structured identifier, if it parses.
    #[must_use]
    pub fn language_identifier(&self) -> Option<LanguageIdentifier> {
        self.resolved_language.as_deref()?.parse().ok()
    }
}

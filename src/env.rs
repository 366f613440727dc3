// SPDX-License-Identifier: MPL-2.0
//! Snapshot of the environment markers the bootstrap reacts to.
//!
//! The process environment is read exactly once, into a [`BootstrapEnv`].
//! Every later decision (localization short-circuit, resolution strategy)
//! is made from that snapshot, which also lets tests describe an
//! environment without touching the real one.

/// JSON localization descriptor (see [`crate::nls::NlsConfiguration`]).
pub const ENV_NLS_CONFIG: &str = "HOST_NLS_CONFIG";

/// Development mode marker. Any non-empty value enables it.
pub const ENV_DEV: &str = "HOST_DEV";

/// Set when the host runs us as a plain runtime inside its embedded shell.
pub const ENV_RUN_AS_EMBEDDED: &str = "HOST_RUN_AS_EMBEDDED";

/// Version of the embedded host runtime, when there is one.
pub const ENV_EMBEDDED_RUNTIME_VERSION: &str = "HOST_EMBEDDED_RUNTIME_VERSION";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapEnv {
    /// Raw, unparsed payload of [`ENV_NLS_CONFIG`].
    pub nls_config: Option<String>,
    pub dev_mode: bool,
    pub run_as_embedded: bool,
    pub embedded_runtime_version: Option<String>,
}

impl BootstrapEnv {
    /// Captures the current process environment.
    #[must_use]
    pub fn from_process() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a snapshot from an arbitrary key lookup.
    ///
    /// Empty values count as unset, matching how the host shell exports
    /// markers it wants cleared.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        Self {
            nls_config: get(ENV_NLS_CONFIG),
            dev_mode: get(ENV_DEV).is_some(),
            run_as_embedded: get(ENV_RUN_AS_EMBEDDED).is_some(),
            embedded_runtime_version: get(ENV_EMBEDDED_RUNTIME_VERSION),
        }
    }

    /// True when either embedded-runtime marker is present.
    #[must_use]
    pub fn is_embedded_runtime(&self) -> bool {
        self.run_as_embedded || self.embedded_runtime_version.is_some()
    }
}

// SPDX-License-Identifier: MPL-2.0
//! Module specifier resolution.
//!
//! Every import goes through a [`ResolverChain`]: registered hooks run
//! newest-first, each either answering on its own or delegating to the rest
//! of the chain via [`Next`]. The chain ends in the default resolver, which
//! maps relative and absolute specifiers to files under the file root and
//! bare names to host builtins.
//!
//! When the process runs inside the embedded host runtime, the plain `fs`
//! builtin must not be used: the runtime patches it to see into its packed
//! archives. [`ResolverChain::install_if_applicable`] installs a hook that
//! sends `fs` to the unpatched `original-fs` builtin instead.

use crate::env::BootstrapEnv;
use std::fmt;
use std::path::{Path, PathBuf};

/// Filesystem builtin as requested by modules.
pub const FS_MODULE: &str = "fs";

/// Unpatched filesystem builtin provided by the embedded runtime.
pub const ORIGINAL_FS_MODULE: &str = "original-fs";

const BUILTIN_SCHEME: &str = "builtin:";

/// How module resolution must behave in this process, decided once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStrategy {
    /// Plain runtime: default resolution only.
    Default,
    /// Inside the embedded host runtime: redirect `fs` to `original-fs`.
    EmbeddedRuntime,
}

impl ResolutionStrategy {
    #[must_use]
    pub fn detect(env: &BootstrapEnv) -> Self {
        Self::from_capability(env.is_embedded_runtime())
    }

    #[must_use]
    pub fn from_capability(embedded_runtime: bool) -> Self {
        if embedded_runtime {
            Self::EmbeddedRuntime
        } else {
            Self::Default
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleFormat {
    /// Provided in-process by the host.
    Builtin,
    /// Read from disk.
    File,
}

/// Outcome of resolving a specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// `builtin:<name>` or a filesystem path.
    pub url: String,
    pub format: ModuleFormat,
    /// Set when a hook answered without consulting the rest of the chain.
    pub short_circuit: bool,
}

impl Resolution {
    #[must_use]
    pub fn builtin(name: &str) -> Self {
        Self {
            url: format!("{BUILTIN_SCHEME}{name}"),
            format: ModuleFormat::Builtin,
            short_circuit: false,
        }
    }

    #[must_use]
    pub fn file(path: &Path) -> Self {
        Self {
            url: path.to_string_lossy().into_owned(),
            format: ModuleFormat::File,
            short_circuit: false,
        }
    }

    /// Builtin name, for builtin resolutions.
    #[must_use]
    pub fn builtin_name(&self) -> Option<&str> {
        match self.format {
            ModuleFormat::Builtin => self.url.strip_prefix(BUILTIN_SCHEME),
            ModuleFormat::File => None,
        }
    }

    /// Filesystem path, for file resolutions.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self.format {
            ModuleFormat::File => Some(Path::new(&self.url)),
            ModuleFormat::Builtin => None,
        }
    }
}

/// An interceptor in the resolution pipeline.
pub trait ResolveHook: fmt::Debug + Send + Sync {
    /// Resolves `specifier`, or hands it to `next` unchanged.
    fn resolve(&self, specifier: &str, next: Next<'_>) -> Resolution;
}

/// The remainder of the chain below a hook.
pub struct Next<'a> {
    hooks: &'a [Box<dyn ResolveHook>],
    root: &'a Path,
}

impl Next<'_> {
    pub fn resolve(self, specifier: &str) -> Resolution {
        match self.hooks.split_last() {
            Some((hook, rest)) => hook.resolve(
                specifier,
                Next {
                    hooks: rest,
                    root: self.root,
                },
            ),
            None => default_resolve(specifier, self.root),
        }
    }
}

fn default_resolve(specifier: &str, root: &Path) -> Resolution {
    let is_path = specifier.starts_with("./")
        || specifier.starts_with("../")
        || Path::new(specifier).is_absolute();

    if is_path {
        let relative = specifier.strip_prefix("./").unwrap_or(specifier);
        Resolution::file(&root.join(relative))
    } else {
        Resolution::builtin(specifier)
    }
}

/// Redirects one builtin name to another and stops resolution there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinRedirect {
    from: String,
    to: String,
}

impl BuiltinRedirect {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// The `fs` -> `original-fs` redirect used inside the embedded runtime.
    #[must_use]
    pub fn original_fs() -> Self {
        Self::new(FS_MODULE, ORIGINAL_FS_MODULE)
    }
}

impl ResolveHook for BuiltinRedirect {
    fn resolve(&self, specifier: &str, next: Next<'_>) -> Resolution {
        if specifier == self.from {
            return Resolution {
                short_circuit: true,
                ..Resolution::builtin(&self.to)
            };
        }
        next.resolve(specifier)
    }
}

/// Ordered set of resolution hooks over the default resolver.
#[derive(Debug)]
pub struct ResolverChain {
    root: PathBuf,
    hooks: Vec<Box<dyn ResolveHook>>,
    strategy: ResolutionStrategy,
    embedded_hook_installed: bool,
}

impl ResolverChain {
    /// Creates a chain resolving relative specifiers against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            hooks: Vec::new(),
            strategy: ResolutionStrategy::Default,
            embedded_hook_installed: false,
        }
    }

    /// Adds a hook; it runs before every previously registered hook.
    pub fn register(&mut self, hook: impl ResolveHook + 'static) {
        self.hooks.push(Box::new(hook));
    }

    /// Installs the embedded-runtime redirect when `strategy` calls for it.
    ///
    /// Idempotent: the redirect is installed at most once per chain. Returns
    /// whether this call installed it.
    pub fn install_if_applicable(&mut self, strategy: ResolutionStrategy) -> bool {
        if strategy != ResolutionStrategy::EmbeddedRuntime || self.embedded_hook_installed {
            return false;
        }
        self.register(BuiltinRedirect::original_fs());
        self.strategy = strategy;
        self.embedded_hook_installed = true;
        tracing::debug!("redirecting `{FS_MODULE}` to `{ORIGINAL_FS_MODULE}`");
        true
    }

    #[must_use]
    pub fn strategy(&self) -> ResolutionStrategy {
        self.strategy
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    pub fn resolve(&self, specifier: &str) -> Resolution {
        Next {
            hooks: &self.hooks,
            root: &self.root,
        }
        .resolve(specifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> ResolverChain {
        ResolverChain::new("/opt/host")
    }

    #[test]
    fn default_chain_resolves_relative_to_root() {
        let resolution = chain().resolve("./entry.toml");
        assert_eq!(resolution.format, ModuleFormat::File);
        assert_eq!(resolution.url, "/opt/host/entry.toml");
        assert!(!resolution.short_circuit);
    }

    #[test]
    fn absolute_specifier_ignores_root() {
        let resolution = chain().resolve("/srv/other.toml");
        assert_eq!(resolution.path(), Some(Path::new("/srv/other.toml")));
    }

    #[test]
    fn bare_names_are_builtins() {
        let resolution = chain().resolve(FS_MODULE);
        assert_eq!(resolution.builtin_name(), Some(FS_MODULE));
        assert!(resolution.path().is_none());
    }

    #[test]
    fn default_strategy_installs_nothing() {
        let mut chain = chain();
        assert!(!chain.install_if_applicable(ResolutionStrategy::Default));
        assert_eq!(chain.hook_count(), 0);
        assert_eq!(chain.resolve(FS_MODULE).builtin_name(), Some(FS_MODULE));
    }

    #[test]
    fn embedded_strategy_redirects_fs() {
        let mut chain = chain();
        assert!(chain.install_if_applicable(ResolutionStrategy::EmbeddedRuntime));

        let resolution = chain.resolve(FS_MODULE);
        assert_eq!(resolution.builtin_name(), Some(ORIGINAL_FS_MODULE));
        assert_eq!(resolution.url, "builtin:original-fs");
        assert!(resolution.short_circuit);
        assert_eq!(chain.strategy(), ResolutionStrategy::EmbeddedRuntime);
    }

    #[test]
    fn embedded_hook_passes_other_specifiers_through() {
        let mut chain = chain();
        chain.install_if_applicable(ResolutionStrategy::EmbeddedRuntime);

        assert_eq!(chain.resolve("path"), Resolution::builtin("path"));
        assert_eq!(
            chain.resolve("./entry.toml"),
            ResolverChain::new("/opt/host").resolve("./entry.toml")
        );
        assert_eq!(chain.resolve("fs/promises").builtin_name(), Some("fs/promises"));
    }

    #[test]
    fn installation_happens_once() {
        let mut chain = chain();
        assert!(chain.install_if_applicable(ResolutionStrategy::EmbeddedRuntime));
        assert!(!chain.install_if_applicable(ResolutionStrategy::EmbeddedRuntime));
        assert_eq!(chain.hook_count(), 1);
    }

    #[test]
    fn newest_hook_runs_first() {
        let mut chain = chain();
        chain.register(BuiltinRedirect::new("fs", "first"));
        chain.register(BuiltinRedirect::new("fs", "second"));
        assert_eq!(chain.resolve("fs").builtin_name(), Some("second"));
    }

    #[test]
    fn hooks_delegate_down_the_chain() {
        let mut chain = chain();
        chain.register(BuiltinRedirect::new("a", "b"));
        chain.register(BuiltinRedirect::new("c", "d"));
        assert_eq!(chain.resolve("a").builtin_name(), Some("b"));
        assert_eq!(chain.resolve("c").builtin_name(), Some("d"));
    }

    #[test]
    fn strategy_detection_follows_environment() {
        let plain = BootstrapEnv::default();
        assert_eq!(ResolutionStrategy::detect(&plain), ResolutionStrategy::Default);

        let embedded = BootstrapEnv {
            embedded_runtime_version: Some("39.0.0".to_string()),
            ..BootstrapEnv::default()
        };
        assert_eq!(
            ResolutionStrategy::detect(&embedded),
            ResolutionStrategy::EmbeddedRuntime
        );
    }
}

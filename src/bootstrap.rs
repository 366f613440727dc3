// SPDX-License-Identifier: MPL-2.0
//! Load orchestration: localization first, then the entry module.
//!
//! [`Bootstrap`] owns everything the startup sequence touches. Construction
//! installs the resolution hook (before anything could be imported) and
//! publishes the file root. [`Bootstrap::load`] then waits for the memoized
//! localization setup and only afterwards imports the requested entry
//! module, so an entry module always starts with its message catalog in
//! place.
//!
//! # Examples
//!
//! ```no_run
//! use host_bootstrap::bootstrap::{Bootstrap, BootstrapOptions};
//! use host_bootstrap::env::BootstrapEnv;
//!
//! # async fn run() -> host_bootstrap::error::Result<()> {
//! let bootstrap = Bootstrap::new(BootstrapOptions::new(
//!     BootstrapEnv::from_process(),
//!     "/opt/host",
//! ))?;
//!
//! if let Some(result) = bootstrap.load(Some("workbench")).await {
//!     let module = result?;
//!     println!("loaded {}", module.resolution.url);
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::DEFAULT_MODULE_EXTENSION;
use crate::env::BootstrapEnv;
use crate::error::Result;
use crate::module::{
    declared_imports, FileModuleLoader, ImportError, LoadedModule, ModuleLoader, ModuleSpecifier,
};
use crate::nls::{CatalogFs, LocalizationResolver, NlsConfiguration, TokioFs};
use crate::perf::{marks, PerformanceMarks};
use crate::resolve::{ResolutionStrategy, ResolverChain};
use crate::state::ProcessState;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Continuation invoked with the imported entry module.
pub type OnLoad = Box<dyn FnOnce(LoadedModule) + Send + 'static>;

/// Continuation invoked when the entry module fails to import.
pub type OnError = Box<dyn FnOnce(ImportError) + Send + 'static>;

/// Inputs captured once at startup.
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    pub env: BootstrapEnv,
    /// Directory entry modules are resolved against.
    pub file_root: PathBuf,
    /// Extension appended to entry module names, without the dot.
    pub module_extension: String,
}

impl BootstrapOptions {
    pub fn new(env: BootstrapEnv, file_root: impl Into<PathBuf>) -> Self {
        Self {
            env,
            file_root: file_root.into(),
            module_extension: DEFAULT_MODULE_EXTENSION.to_string(),
        }
    }

    #[must_use]
    pub fn with_module_extension(mut self, extension: impl Into<String>) -> Self {
        self.module_extension = extension.into();
        self
    }
}

#[derive(Debug)]
pub struct Bootstrap<L = FileModuleLoader, F = TokioFs> {
    state: Arc<ProcessState>,
    marks: Arc<PerformanceMarks>,
    resolver: ResolverChain,
    nls: LocalizationResolver<F>,
    loader: L,
    module_extension: String,
}

impl Bootstrap {
    /// Bootstrap with the on-disk module loader and `tokio::fs` catalog access.
    pub fn new(options: BootstrapOptions) -> Result<Self> {
        Self::with_parts(options, FileModuleLoader::new(), TokioFs)
    }
}

impl<L: ModuleLoader, F: CatalogFs> Bootstrap<L, F> {
    /// Bootstrap with a custom module loader and catalog filesystem.
    pub fn with_parts(options: BootstrapOptions, loader: L, fs: F) -> Result<Self> {
        let BootstrapOptions {
            env,
            file_root,
            module_extension,
        } = options;

        // Must precede any resolution, including the entry import.
        let mut resolver = ResolverChain::new(file_root.clone());
        resolver.install_if_applicable(ResolutionStrategy::detect(&env));

        let state = Arc::new(ProcessState::new());
        state.set_file_root(file_root)?;

        let marks = Arc::new(PerformanceMarks::default());
        let nls = LocalizationResolver::new(&env, Arc::clone(&state), Arc::clone(&marks), fs);

        Ok(Self {
            state,
            marks,
            resolver,
            nls,
            loader,
            module_extension,
        })
    }

    pub fn state(&self) -> &Arc<ProcessState> {
        &self.state
    }

    pub fn marks(&self) -> &Arc<PerformanceMarks> {
        &self.marks
    }

    pub fn resolver(&self) -> &ResolverChain {
        &self.resolver
    }

    #[must_use]
    pub fn strategy(&self) -> ResolutionStrategy {
        self.resolver.strategy()
    }

    /// Memoized localization setup; see [`LocalizationResolver::resolve`].
    pub async fn localization(&self) -> Option<&NlsConfiguration> {
        self.nls.resolve().await
    }

    /// Loads the entry module `name` once localization has settled.
    ///
    /// Returns `None` without doing anything when `name` is absent or empty.
    /// Otherwise the import outcome; an import failure is for the caller to
    /// judge and is not logged here.
    pub async fn load(
        &self,
        name: Option<&str>,
    ) -> Option<std::result::Result<LoadedModule, ImportError>> {
        let name = name.filter(|name| !name.is_empty())?;

        self.nls.resolve().await;

        self.marks.mark(marks::WILL_LOAD_CODE);
        let result = self.import(name).await;
        self.marks.mark(marks::DID_LOAD_CODE);

        Some(result)
    }

    async fn import(&self, name: &str) -> std::result::Result<LoadedModule, ImportError> {
        let specifier = ModuleSpecifier::sibling(name, &self.module_extension);
        let resolution = self.resolver.resolve(specifier.as_str());
        tracing::debug!(%specifier, url = %resolution.url, "importing entry module");

        let exports = self.loader.import(&resolution).await?;
        let imports = declared_imports(&exports)
            .map(|specifier| self.resolver.resolve(specifier))
            .collect();

        Ok(LoadedModule {
            name: name.to_string(),
            resolution,
            exports,
            imports,
        })
    }
}

impl<L, F> Bootstrap<L, F>
where
    L: ModuleLoader + 'static,
    F: CatalogFs + 'static,
{
    /// Callback form of [`Bootstrap::load`], run as a task on the current
    /// tokio runtime.
    ///
    /// Returns `None` if `name` is absent or empty (neither continuation
    /// runs) or if no runtime is available. Without `on_error`, import
    /// failures are logged and otherwise dropped.
    pub fn load_with(
        self: &Arc<Self>,
        name: Option<String>,
        on_load: Option<OnLoad>,
        on_error: Option<OnError>,
    ) -> Option<JoinHandle<()>> {
        let name = name.filter(|name| !name.is_empty())?;
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(err) => {
                tracing::error!("cannot load entry module '{name}': {err}");
                return None;
            }
        };

        let this = Arc::clone(self);
        Some(handle.spawn(async move {
            match this.load(Some(&name)).await {
                Some(Ok(module)) => {
                    if let Some(on_load) = on_load {
                        on_load(module);
                    }
                }
                Some(Err(err)) => match on_error {
                    Some(on_error) => on_error(err),
                    None => tracing::error!("{err}"),
                },
                None => {}
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleExports;
    use crate::resolve::{ModuleFormat, Resolution, FS_MODULE, ORIGINAL_FS_MODULE};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::{tempdir, TempDir};

    /// Loader that records whether localization had settled when asked to import.
    #[derive(Debug, Default)]
    struct ProbeLoader {
        imports: AtomicUsize,
        fail: bool,
    }

    impl ModuleLoader for ProbeLoader {
        async fn import(
            &self,
            resolution: &Resolution,
        ) -> std::result::Result<ModuleExports, ImportError> {
            self.imports.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ImportError::NotFound(resolution.url.clone()));
            }
            let mut exports = ModuleExports::new();
            exports.insert("url".to_string(), toml::Value::String(resolution.url.clone()));
            Ok(exports)
        }
    }

    fn root() -> TempDir {
        tempdir().expect("failed to create temp dir")
    }

    fn write_module(dir: &TempDir, name: &str, contents: &str) {
        std::fs::write(dir.path().join(format!("{name}.toml")), contents)
            .expect("failed to write module");
    }

    #[test]
    fn construction_publishes_file_root() {
        let dir = root();
        let bootstrap =
            Bootstrap::new(BootstrapOptions::new(BootstrapEnv::default(), dir.path())).unwrap();
        assert_eq!(bootstrap.state().file_root(), Some(dir.path()));
        assert_eq!(bootstrap.strategy(), ResolutionStrategy::Default);
    }

    #[test]
    fn construction_installs_hook_for_embedded_runtime() {
        let env = BootstrapEnv {
            run_as_embedded: true,
            ..BootstrapEnv::default()
        };
        let bootstrap = Bootstrap::new(BootstrapOptions::new(env, "/opt/host")).unwrap();

        assert_eq!(bootstrap.strategy(), ResolutionStrategy::EmbeddedRuntime);
        assert_eq!(
            bootstrap.resolver().resolve(FS_MODULE).builtin_name(),
            Some(ORIGINAL_FS_MODULE)
        );
    }

    #[tokio::test]
    async fn missing_name_is_a_no_op() {
        let bootstrap = Bootstrap::with_parts(
            BootstrapOptions::new(BootstrapEnv::default(), "/opt/host"),
            ProbeLoader::default(),
            TokioFs,
        )
        .unwrap();

        assert!(bootstrap.load(None).await.is_none());
        assert!(bootstrap.load(Some("")).await.is_none());
        assert_eq!(bootstrap.loader.imports.load(Ordering::SeqCst), 0);
        assert!(bootstrap.marks().names().is_empty());
    }

    #[tokio::test]
    async fn loads_file_module_after_localization() {
        let dir = root();
        write_module(&dir, "entry", "title = \"Entry\"\n");
        let bootstrap =
            Bootstrap::new(BootstrapOptions::new(BootstrapEnv::default(), dir.path())).unwrap();

        let module = bootstrap
            .load(Some("entry"))
            .await
            .expect("name given")
            .expect("import succeeds");

        assert_eq!(module.name, "entry");
        assert_eq!(module.resolution.format, ModuleFormat::File);
        assert_eq!(module.export("title").and_then(toml::Value::as_str), Some("Entry"));

        let names = bootstrap.marks().names();
        let will_nls = bootstrap.marks().position(marks::WILL_LOAD_NLS).unwrap();
        let will_code = bootstrap.marks().position(marks::WILL_LOAD_CODE).unwrap();
        let did_code = bootstrap.marks().position(marks::DID_LOAD_CODE).unwrap();
        assert!(will_nls < will_code && will_code < did_code, "{names:?}");
    }

    #[tokio::test]
    async fn import_waits_for_catalog() {
        let dir = root();
        let messages = dir.path().join("nls.messages.json");
        std::fs::write(&messages, r#"{"hello":"world"}"#).unwrap();
        write_module(&dir, "entry", "");
        let env = BootstrapEnv {
            nls_config: Some(json!({ "defaultMessagesFile": messages }).to_string()),
            ..BootstrapEnv::default()
        };
        let bootstrap = Bootstrap::new(BootstrapOptions::new(env, dir.path())).unwrap();

        bootstrap.load(Some("entry")).await.unwrap().unwrap();

        assert!(bootstrap.state().nls_messages().is_some());
        assert_eq!(
            bootstrap.marks().names(),
            vec![
                marks::WILL_LOAD_NLS.to_string(),
                marks::DID_LOAD_NLS.to_string(),
                marks::WILL_LOAD_CODE.to_string(),
                marks::DID_LOAD_CODE.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn custom_extension_is_applied() {
        let dir = root();
        let bootstrap = Bootstrap::with_parts(
            BootstrapOptions::new(BootstrapEnv::default(), dir.path()).with_module_extension("mod"),
            ProbeLoader::default(),
            TokioFs,
        )
        .unwrap();

        let module = bootstrap.load(Some("main")).await.unwrap().unwrap();
        let expected = dir.path().join("main.mod");
        assert_eq!(module.resolution.path(), Some(expected.as_path()));
    }

    #[tokio::test]
    async fn import_failure_is_returned() {
        let dir = root();
        let bootstrap =
            Bootstrap::new(BootstrapOptions::new(BootstrapEnv::default(), dir.path())).unwrap();

        let err = bootstrap.load(Some("absent")).await.unwrap().unwrap_err();
        assert!(matches!(err, ImportError::NotFound(url) if url.ends_with("absent.toml")));
        assert!(bootstrap.marks().position(marks::DID_LOAD_CODE).is_some());
    }

    #[tokio::test]
    async fn declared_imports_go_through_the_hook() {
        let dir = root();
        write_module(&dir, "entry", "imports = [\"fs\", \"./lib.toml\"]\n");
        let env = BootstrapEnv {
            embedded_runtime_version: Some("39.0.0".to_string()),
            ..BootstrapEnv::default()
        };
        let bootstrap = Bootstrap::new(BootstrapOptions::new(env, dir.path())).unwrap();

        let module = bootstrap.load(Some("entry")).await.unwrap().unwrap();

        assert_eq!(module.imports.len(), 2);
        assert_eq!(module.imports[0], {
            let mut redirect = Resolution::builtin(ORIGINAL_FS_MODULE);
            redirect.short_circuit = true;
            redirect
        });
        assert_eq!(module.imports[1].path(), Some(dir.path().join("lib.toml").as_path()));
    }

    #[tokio::test]
    async fn repeated_loads_share_localization() {
        let dir = root();
        write_module(&dir, "a", "");
        write_module(&dir, "b", "");
        let bootstrap =
            Bootstrap::new(BootstrapOptions::new(BootstrapEnv::default(), dir.path())).unwrap();

        let (a, b) = tokio::join!(bootstrap.load(Some("a")), bootstrap.load(Some("b")));
        assert!(a.unwrap().is_ok());
        assert!(b.unwrap().is_ok());

        let nls_runs = bootstrap
            .marks()
            .names()
            .iter()
            .filter(|name| *name == marks::WILL_LOAD_NLS)
            .count();
        assert_eq!(nls_runs, 1);
    }

    #[tokio::test]
    async fn load_with_invokes_on_load_only() {
        let dir = root();
        write_module(&dir, "entry", "answer = 42\n");
        let bootstrap = Arc::new(
            Bootstrap::new(BootstrapOptions::new(BootstrapEnv::default(), dir.path())).unwrap(),
        );

        let loaded = Arc::new(Mutex::new(Vec::<LoadedModule>::new()));
        let errors = Arc::new(AtomicUsize::new(0));
        let on_load: OnLoad = {
            let loaded = Arc::clone(&loaded);
            Box::new(move |module: LoadedModule| loaded.lock().unwrap().push(module))
        };
        let on_error: OnError = {
            let errors = Arc::clone(&errors);
            Box::new(move |_: ImportError| {
                errors.fetch_add(1, Ordering::SeqCst);
            })
        };

        bootstrap
            .load_with(Some("entry".to_string()), Some(on_load), Some(on_error))
            .expect("task spawned")
            .await
            .expect("task completed");

        let loaded = loaded.lock().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].export("answer").and_then(toml::Value::as_integer), Some(42));
        assert_eq!(errors.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn load_with_routes_failure_to_on_error() {
        let bootstrap = Arc::new(
            Bootstrap::with_parts(
                BootstrapOptions::new(BootstrapEnv::default(), "/opt/host"),
                ProbeLoader {
                    fail: true,
                    ..ProbeLoader::default()
                },
                TokioFs,
            )
            .unwrap(),
        );

        let errors = Arc::new(Mutex::new(Vec::<ImportError>::new()));
        let on_error: OnError = {
            let errors = Arc::clone(&errors);
            Box::new(move |err: ImportError| errors.lock().unwrap().push(err))
        };
        let on_load: OnLoad = Box::new(|_: LoadedModule| panic!("on_load must not run"));

        bootstrap
            .load_with(Some("entry".to_string()), Some(on_load), Some(on_error))
            .unwrap()
            .await
            .unwrap();

        assert_eq!(errors.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn load_with_without_on_error_does_not_panic() {
        let bootstrap = Arc::new(
            Bootstrap::with_parts(
                BootstrapOptions::new(BootstrapEnv::default(), "/opt/host"),
                ProbeLoader {
                    fail: true,
                    ..ProbeLoader::default()
                },
                TokioFs,
            )
            .unwrap(),
        );

        let handle = bootstrap.load_with(Some("entry".to_string()), None, None).unwrap();
        assert!(handle.await.is_ok());
    }

    #[tokio::test]
    async fn load_with_without_name_spawns_nothing() {
        let bootstrap = Arc::new(
            Bootstrap::new(BootstrapOptions::new(BootstrapEnv::default(), "/opt/host")).unwrap(),
        );
        let on_load: OnLoad = Box::new(|_: LoadedModule| panic!("on_load must not run"));
        let on_error: OnError = Box::new(|_: ImportError| panic!("on_error must not run"));

        assert!(bootstrap.load_with(None, Some(on_load), Some(on_error)).is_none());
    }

    #[test]
    fn load_with_outside_runtime_returns_none() {
        let bootstrap = Arc::new(
            Bootstrap::new(BootstrapOptions::new(BootstrapEnv::default(), "/opt/host")).unwrap(),
        );
        assert!(bootstrap.load_with(Some("entry".to_string()), None, None).is_none());
    }
}

// SPDX-License-Identifier: MPL-2.0
use host_bootstrap::bootstrap::{Bootstrap, BootstrapOptions};
use host_bootstrap::env::BootstrapEnv;
use host_bootstrap::{config, logging, paths};
use std::process::ExitCode;

const HELP: &str = "\
Usage: host_bootstrap [OPTIONS] [ENTRY]

Resolves localization, then loads the entry module ENTRY from the file root.

Options:
  --root DIR         Directory entry modules are resolved against
  --config-dir DIR   Directory holding bootstrap.toml
  --lang TAG         UI language when HOST_NLS_CONFIG is not set
  -h, --help         Print this help
";

struct Flags {
    root: Option<String>,
    config_dir: Option<String>,
    lang: Option<String>,
    entry: Option<String>,
}

fn parse_flags() -> Result<Option<Flags>, pico_args::Error> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return Ok(None);
    }

    Ok(Some(Flags {
        root: args.opt_value_from_str("--root")?,
        config_dir: args.opt_value_from_str("--config-dir")?,
        lang: args.opt_value_from_str("--lang")?,
        entry: args
            .finish()
            .into_iter()
            .next()
            .and_then(|s| s.into_string().ok()),
    }))
}

#[tokio::main]
async fn main() -> ExitCode {
    let flags = match parse_flags() {
        Ok(Some(flags)) => flags,
        Ok(None) => {
            print!("{HELP}");
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("error: {err}\n\n{HELP}");
            return ExitCode::from(2);
        }
    };

    if let Err(err) = paths::init_cli_overrides(flags.root, flags.config_dir) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    let (settings, warning) = config::load();
    logging::init_tracing(settings.log_filter());
    if let Some(warning) = warning {
        tracing::warn!("{warning}");
    }

    let mut env = BootstrapEnv::from_process();
    if env.nls_config.is_none() {
        if let Some(lang) = flags.lang {
            env.nls_config = Some(serde_json::json!({ "resolvedLanguage": lang }).to_string());
        }
    }

    let Some(file_root) = paths::get_file_root() else {
        tracing::error!("cannot determine the file root; pass --root");
        return ExitCode::FAILURE;
    };

    let options =
        BootstrapOptions::new(env, file_root).with_module_extension(settings.module_extension());
    let bootstrap = match Bootstrap::new(options) {
        Ok(bootstrap) => bootstrap,
        Err(err) => {
            tracing::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match bootstrap.load(flags.entry.as_deref()).await {
        None => {
            tracing::info!("no entry module given");
            ExitCode::SUCCESS
        }
        Some(Ok(module)) => {
            println!(
                "loaded {} from {} ({} exports)",
                module.name,
                module.resolution.url,
                module.exports.len()
            );
            ExitCode::SUCCESS
        }
        Some(Err(err)) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

//! # Tessera Manager
//!
//! Manage-mode host: autoloads the command module of every installed subapp and exposes
//! the collected commands as subcommands of one `manager` program.
//!
//! The manager-mode flag defaults to on for this binary. Setting
//! `AUTOLOADER_MANAGER_MODE=0` switches the autoloader to serve mode: route and event
//! modules are loaded and install hooks run, while no commands are exposed and only
//! `--help` remains.
//!
//! ## Exit codes
//! * `0`: help was printed or the command succeeded
//! * `1`: the command failed
//! * `2`: the command line could not be parsed

#![allow(clippy::print_stdout, clippy::print_stderr)]

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::ExitCode;
use tessera::domain::config::AppConfig;
use tessera::kernel::config::load_config;
use tessera::prelude::*;
use tracing::{debug, error, warn};

/// Program name shown in usage lines.
pub const PROGRAM: &str = "manager";

/// Autoloads the command modules and builds the command line.
///
/// # Errors
/// Returns an error if the subapps cannot be registered or autoloaded, or if a command
/// declares arguments the parser cannot express.
pub fn cli(cfg: &AppConfig) -> Result<Cli> {
    let registry =
        tessera::registry_with(ModuleResolver::new(cfg.autoload.namespace_root.clone()))
            .context("Failed to register subapps")?;

    let mut host = HostApp::new();
    let autoloader = Autoloader::builder(registry)
        .main_subapp(cfg.autoload.main_subapp.clone())
        .default_mode(Mode::Manage)
        .build(&mut host)
        .context("Autoloading subapps failed")?;
    if autoloader.mode() == Mode::Serve {
        warn!("Manager mode is disabled; no commands were loaded");
    }

    autoloader.cli(PROGRAM).context("Invalid command declarations")
}

/// Parses `argv`, runs the selected command against `root_dir` and maps the outcome to
/// an exit code.
///
/// Parse errors (including `--help` and `--version`) are rendered by clap, which exits
/// the process itself.
///
/// # Errors
/// Returns an error if the command line cannot be built.
pub fn run<I, T>(argv: I, root_dir: &Path) -> Result<ExitCode>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cfg: AppConfig = load_config(Some(root_dir.join("server"))).unwrap_or_else(|e| {
        debug!("Using default configuration: {e}");
        AppConfig::default()
    });
    let cli = cli(&cfg)?;

    match cli.dispatch(argv, root_dir) {
        Ok(Dispatch::Help(help)) => {
            println!("{help}");
            Ok(ExitCode::SUCCESS)
        },
        Ok(Dispatch::Completed { outcome: Ok(()), .. }) => Ok(ExitCode::SUCCESS),
        Ok(Dispatch::Completed { command, outcome: Err(e) }) => {
            error!(command = %command, "Command failed: {e:#}");
            eprintln!("{PROGRAM} {command}: {e:#}");
            Ok(ExitCode::FAILURE)
        },
        Err(e) => e.exit(),
    }
}

//! Convention-based discovery of subapp modules.
//!
//! The [`Autoloader`] walks the main subapp and then every entry of its `installed_subapps`
//! setting. Depending on the [`Mode`] it either wires route and event modules into the
//! [`HostApp`] or collects command [`Manager`]s for the CLI.
//!
//! Problems with individual modules never abort the run:
//! * a missing module is an expected absence and is logged at `info` (routes, events) or not
//!   at all (commands);
//! * a module whose export has the wrong capability is a contract violation, logged at
//!   `error` and recorded in the [`LoadReport`].

mod context;
mod error;
mod module;
mod registry;
mod report;
mod resolver;

pub use context::AutoloadContext;
pub use error::{AutoloadError, AutoloadErrorExt};
pub use module::{Export, HookFuture, InstallHook, LifecycleHook, Module, SubappRouter};
pub use registry::{ModuleRegistry, SubappRegistration};
pub use report::{ContractViolation, HookKind, LoadEvent, LoadReport};
pub use resolver::{ModulePath, ModuleResolver};

use crate::command::{Cli, CliBuilder, CliError, Manager};
use crate::server::HostApp;
use std::sync::Arc;
use tessera_domain::constants::{
    DEFAULT_MAIN_SUBAPP, INSTALLED_SUBAPPS, MANAGER, MODE_ENV, ON_INSTALL, ON_SHUTDOWN,
    ON_STARTUP, ROUTER,
};
use tessera_domain::module::{Mode, ModuleKind};
use tracing::{debug, error, info, trace};

const TARGET: &str = "autoload";

/// Options recognised by the autoloader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoloaderOptions {
    /// Subapp loaded first and queried for settings.
    pub main_subapp: String,
    /// Mode used when `AUTOLOADER_MANAGER_MODE` is absent.
    pub default_mode: Mode,
    /// Forces a mode without looking at the environment.
    pub mode: Option<Mode>,
}

impl Default for AutoloaderOptions {
    fn default() -> Self {
        Self { main_subapp: DEFAULT_MAIN_SUBAPP.to_owned(), default_mode: Mode::Serve, mode: None }
    }
}

/// Reads the mode flag from the environment, falling back to `default` when it is unset.
#[must_use]
pub fn mode_from_env(default: Mode) -> Mode {
    std::env::var_os(MODE_ENV)
        .map_or(default, |value| Mode::from_flag(&value.to_string_lossy()))
}

/// Result of one autoloader run.
#[derive(Debug)]
pub struct Autoloader {
    context: Arc<AutoloadContext>,
    managers: Vec<Manager>,
    report: LoadReport,
}

/// Configures and runs an [`Autoloader`].
#[derive(Debug)]
pub struct AutoloaderBuilder {
    registry: ModuleRegistry,
    options: AutoloaderOptions,
}

impl AutoloaderBuilder {
    #[must_use]
    pub fn main_subapp(mut self, name: impl Into<String>) -> Self {
        self.options.main_subapp = name.into();
        self
    }

    #[must_use]
    pub const fn mode(mut self, mode: Mode) -> Self {
        self.options.mode = Some(mode);
        self
    }

    #[must_use]
    pub const fn default_mode(mut self, mode: Mode) -> Self {
        self.options.default_mode = mode;
        self
    }

    #[must_use]
    pub fn options(mut self, options: AutoloaderOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolves the mode, attaches the context to `host` and loads every subapp.
    ///
    /// # Errors
    /// * [`AutoloadError::MissingConfig`] if the main subapp has no config module.
    /// * [`AutoloadError::Hook`] if an install hook fails.
    pub fn build(self, host: &mut HostApp) -> Result<Autoloader, AutoloadError> {
        let mode = self.options.mode.unwrap_or_else(|| mode_from_env(self.options.default_mode));
        let context = Arc::new(AutoloadContext::new(self.options, mode, self.registry));

        // Modules may reach for the context while they are being loaded.
        host.attach(Arc::clone(&context));

        let mut autoloader =
            Autoloader { context: Arc::clone(&context), managers: Vec::new(), report: LoadReport::default() };
        let kinds = mode.kinds();
        info!(target: TARGET, %mode, main_subapp = context.main_subapp(), "Autoloading subapps");

        autoloader.load_subapp(host, context.main_subapp(), kinds)?;

        let installed: Vec<String> = context.config(INSTALLED_SUBAPPS, Vec::new())?;
        for subapp in &installed {
            if autoloader.report.is_loaded(subapp) {
                debug!(target: TARGET, subapp, "Subapp already loaded");
                continue;
            }
            autoloader.load_subapp(host, subapp, kinds)?;
        }

        Ok(autoloader)
    }
}

impl Autoloader {
    #[must_use]
    pub fn builder(registry: ModuleRegistry) -> AutoloaderBuilder {
        AutoloaderBuilder { registry, options: AutoloaderOptions::default() }
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.context.mode()
    }

    #[must_use]
    pub const fn context(&self) -> &Arc<AutoloadContext> {
        &self.context
    }

    /// Managers collected in manage mode, in load order.
    #[must_use]
    pub fn managers(&self) -> &[Manager] {
        &self.managers
    }

    #[must_use]
    pub const fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Builds the command line from the collected managers.
    ///
    /// # Errors
    /// Returns [`CliError`] if a command declares arguments the parser cannot express.
    pub fn cli(&self, program: impl Into<String>) -> Result<Cli, CliError> {
        CliBuilder::new(program)
            .context(Arc::clone(&self.context))
            .managers(self.managers.iter().cloned())
            .build()
    }

    /// Loads the requested kinds of one subapp, route before event before command.
    ///
    /// # Errors
    /// Returns [`AutoloadError::Hook`] if the subapp's install hook fails.
    pub fn load_subapp(
        &mut self,
        host: &mut HostApp,
        subapp: &str,
        kinds: &[ModuleKind],
    ) -> Result<(), AutoloadError> {
        let mut kinds = kinds.to_vec();
        kinds.sort_unstable();
        kinds.dedup();

        self.report.loaded(subapp);
        for kind in kinds {
            match kind {
                ModuleKind::Route => self.load_route(host, subapp),
                ModuleKind::Event => self.load_event(host, subapp)?,
                ModuleKind::Command => {
                    if let Some(manager) = self.load_command(subapp) {
                        self.managers.push(manager);
                    }
                },
            }
        }
        Ok(())
    }

    fn load_route(&mut self, host: &mut HostApp, subapp: &str) {
        let context = Arc::clone(&self.context);
        let path = context.resolver().resolve_kind(subapp, ModuleKind::Route);
        let Ok(module) = context.registry().import_kind(subapp, ModuleKind::Route) else {
            info!(target: TARGET, subapp, %path, "Skipping route: module not found");
            self.report.push(LoadEvent::Skipped { subapp: subapp.to_owned(), path });
            return;
        };

        match module.get(ROUTER) {
            Some(Export::Router(router)) => {
                host.mount_routes(router.clone());
                debug!(target: TARGET, subapp, %path, "Router mounted");
                self.report.push(LoadEvent::Mounted { subapp: subapp.to_owned(), path });
            },
            other => {
                self.violation(subapp, path, ROUTER, "Router", other.map(Export::type_name));
            },
        }
    }

    fn load_event(&mut self, host: &mut HostApp, subapp: &str) -> Result<(), AutoloadError> {
        let context = Arc::clone(&self.context);
        let path = context.resolver().resolve_kind(subapp, ModuleKind::Event);
        let Ok(module) = context.registry().import_kind(subapp, ModuleKind::Event) else {
            info!(target: TARGET, subapp, %path, "Skipping event: module not found");
            self.report.push(LoadEvent::Skipped { subapp: subapp.to_owned(), path });
            return Ok(());
        };

        match module.get(ON_INSTALL) {
            Some(Export::Install(hook)) => {
                hook.call(host).map_err(|source| AutoloadError::Hook {
                    source: source.into(),
                    context: Some(format!("{path}.{ON_INSTALL}").into()),
                })?;
                self.hook_registered(subapp, HookKind::Install);
            },
            Some(other) => {
                self.violation(subapp, path.clone(), ON_INSTALL, "InstallHook", Some(other.type_name()));
            },
            None => {},
        }

        for (name, kind) in [(ON_STARTUP, HookKind::Startup), (ON_SHUTDOWN, HookKind::Shutdown)] {
            match module.get(name) {
                Some(Export::Lifecycle(hook)) => {
                    if kind == HookKind::Startup {
                        host.append_startup_hook(hook.clone());
                    } else {
                        host.append_shutdown_hook(hook.clone());
                    }
                    self.hook_registered(subapp, kind);
                },
                Some(other) => {
                    self.violation(subapp, path.clone(), name, "LifecycleHook", Some(other.type_name()));
                },
                None => {},
            }
        }
        Ok(())
    }

    fn load_command(&mut self, subapp: &str) -> Option<Manager> {
        let context = Arc::clone(&self.context);
        let path = context.resolver().resolve_kind(subapp, ModuleKind::Command);
        let Ok(module) = context.registry().import_kind(subapp, ModuleKind::Command) else {
            trace!(target: TARGET, subapp, %path, "No command module");
            return None;
        };

        match module.get(MANAGER) {
            Some(Export::Manager(manager)) => {
                let mut manager = manager.clone();
                if manager.title().is_none() {
                    manager.set_title(subapp);
                }
                let title = manager.title().unwrap_or(subapp).to_owned();
                debug!(target: TARGET, subapp, %title, commands = manager.commands().len(), "Manager collected");
                self.report.push(LoadEvent::ManagerCollected {
                    subapp: subapp.to_owned(),
                    title,
                    commands: manager.commands().len(),
                });
                Some(manager)
            },
            Some(other) => {
                self.violation(subapp, path, MANAGER, "Manager", Some(other.type_name()));
                None
            },
            None => {
                trace!(target: TARGET, subapp, %path, "Command module exports no manager");
                None
            },
        }
    }

    fn hook_registered(&mut self, subapp: &str, hook: HookKind) {
        debug!(target: TARGET, subapp, %hook, "Hook registered");
        self.report.push(LoadEvent::HookRegistered { subapp: subapp.to_owned(), hook });
    }

    fn violation(
        &mut self,
        subapp: &str,
        path: ModulePath,
        export: &'static str,
        expected: &'static str,
        found: Option<&'static str>,
    ) {
        match found {
            Some(found) => error!(
                target: TARGET,
                subapp, %path, export, expected, found,
                "`{export}` is not a {expected}"
            ),
            None => error!(
                target: TARGET,
                subapp, %path, export, expected,
                "Module has no `{export}` export"
            ),
        }
        self.report.push(LoadEvent::Violation(ContractViolation {
            subapp: subapp.to_owned(),
            path,
            export,
            expected,
            found,
        }));
    }
}

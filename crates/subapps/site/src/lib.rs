//! Main subapp of a Tessera project.
//!
//! Provides the settings every other subapp reads through the autoload context
//! (`project_name`, `installed_subapps`, connection strings), the landing route, lifecycle
//! logging and the project commands (`subapp`, `rm-cache`).

mod command;
mod config;
mod error;
mod event;
mod route;

pub use crate::command::SUBAPPS_DIR;
pub use crate::config::{DEFAULTS, OVERRIDE_PATH, settings};
pub use crate::error::{SiteError, SiteErrorExt};

use tessera_kernel::autoload::{Module, ModuleRegistry};

pub const NAME: &str = "site";

/// Registers the config, route, event and command modules of the site subapp.
///
/// # Errors
/// Returns [`SiteError::Config`] if the site settings cannot be loaded.
pub fn register(registry: &mut ModuleRegistry) -> Result<(), SiteError> {
    let settings = settings()?;
    registry
        .subapp(NAME)
        .config(settings)
        .route(Module::router(route::router()))
        .event(event::module())
        .command(Module::manager(command::manager()));
    tracing::debug!("Site subapp registered");
    Ok(())
}

use super::{AutoloadError, AutoloaderOptions, Module, ModulePath, ModuleRegistry, ModuleResolver};
use crate::config::Settings;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use tessera_domain::module::Mode;

/// Process-wide state of one autoloader run.
///
/// Created by [`Autoloader`](super::Autoloader) before the first module is loaded and shared
/// through an `Arc` with the host application and with every command invocation. Read-only
/// once created.
#[derive(Debug)]
pub struct AutoloadContext {
    options: AutoloaderOptions,
    mode: Mode,
    registry: ModuleRegistry,
}

impl AutoloadContext {
    #[must_use]
    pub const fn new(options: AutoloaderOptions, mode: Mode, registry: ModuleRegistry) -> Self {
        Self { options, mode, registry }
    }

    #[must_use]
    pub const fn options(&self) -> &AutoloaderOptions {
        &self.options
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn main_subapp(&self) -> &str {
        &self.options.main_subapp
    }

    #[must_use]
    pub const fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn resolver(&self) -> &ModuleResolver {
        self.registry.resolver()
    }

    #[must_use]
    pub fn module_name(&self, subapp: &str, module: Option<&str>) -> ModulePath {
        self.resolver().resolve(subapp, module)
    }

    /// Imports a module of any subapp by name.
    ///
    /// # Errors
    /// Returns [`AutoloadError::ModuleNotFound`] if the subapp registered no such module.
    pub fn import_module(&self, subapp: &str, module: &str) -> Result<&Module, AutoloadError> {
        self.registry.import(subapp, module)
    }

    /// Settings of the main subapp.
    ///
    /// # Errors
    /// Returns [`AutoloadError::MissingConfig`] if the main subapp registered no config module.
    pub fn settings(&self) -> Result<&Settings, AutoloadError> {
        self.registry.settings_for(self.main_subapp()).ok_or_else(|| {
            AutoloadError::MissingConfig {
                subapp: Cow::Owned(self.main_subapp().to_owned()),
                context: None,
            }
        })
    }

    /// Reads a dotted key from the main subapp's settings, falling back to `default`.
    ///
    /// # Errors
    /// Returns [`AutoloadError::MissingConfig`] if the main subapp registered no config module.
    pub fn config<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, AutoloadError> {
        Ok(self.settings()?.get_or(key, default))
    }
}

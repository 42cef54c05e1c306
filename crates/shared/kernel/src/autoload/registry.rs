use super::{AutoloadError, Module, ModulePath, ModuleResolver};
use crate::config::Settings;
use fxhash::FxHashMap;
use tessera_domain::constants::CONFIG_MODULE;
use tessera_domain::module::ModuleKind;
use tracing::warn;

/// Table of every module the compiled-in subapps provide, keyed by resolved module path.
///
/// Populated once at process start: each subapp crate exposes a `register` function that
/// adds its modules here. The autoloader only ever reads from it.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    resolver: ModuleResolver,
    modules: FxHashMap<ModulePath, Module>,
    settings: FxHashMap<ModulePath, Settings>,
    subapps: Vec<String>,
}

impl ModuleRegistry {
    #[must_use]
    pub fn new(resolver: ModuleResolver) -> Self {
        Self { resolver, ..Self::default() }
    }

    #[must_use]
    pub const fn resolver(&self) -> &ModuleResolver {
        &self.resolver
    }

    /// Starts (or continues) the registration of a subapp.
    pub fn subapp(&mut self, name: impl Into<String>) -> SubappRegistration<'_> {
        let name = name.into();
        if !self.subapps.contains(&name) {
            self.subapps.push(name.clone());
        }
        SubappRegistration { registry: self, subapp: name }
    }

    /// Names of registered subapps, in registration order.
    #[must_use]
    pub fn subapps(&self) -> &[String] {
        &self.subapps
    }

    /// Looks up a module of a subapp by module name.
    ///
    /// # Errors
    /// Returns [`AutoloadError::ModuleNotFound`] when nothing was registered under the path.
    pub fn import(&self, subapp: &str, module: &str) -> Result<&Module, AutoloadError> {
        let path = self.resolver.resolve(subapp, Some(module));
        self.modules
            .get(&path)
            .ok_or(AutoloadError::ModuleNotFound { path, context: None })
    }

    /// Looks up one of the three convention modules of a subapp.
    ///
    /// # Errors
    /// Returns [`AutoloadError::ModuleNotFound`] when the subapp does not provide it.
    pub fn import_kind(&self, subapp: &str, kind: ModuleKind) -> Result<&Module, AutoloadError> {
        self.import(subapp, kind.as_str())
    }

    /// Settings exposed by a subapp's `config` module.
    #[must_use]
    pub fn settings_for(&self, subapp: &str) -> Option<&Settings> {
        self.settings.get(&self.resolver.resolve_config(subapp))
    }

    fn insert(&mut self, path: ModulePath, module: Module) {
        if self.modules.insert(path.clone(), module).is_some() {
            warn!(target: "autoload", %path, "Module registered twice, keeping the last one");
        }
    }
}

/// Fluent registration of one subapp's modules.
#[derive(Debug)]
pub struct SubappRegistration<'a> {
    registry: &'a mut ModuleRegistry,
    subapp: String,
}

impl SubappRegistration<'_> {
    /// Registers the subapp's `config` module.
    pub fn config(&mut self, settings: Settings) -> &mut Self {
        let path = self.registry.resolver.resolve(&self.subapp, Some(CONFIG_MODULE));
        self.registry.settings.insert(path, settings);
        self
    }

    pub fn route(&mut self, module: Module) -> &mut Self {
        self.kind(ModuleKind::Route, module)
    }

    pub fn event(&mut self, module: Module) -> &mut Self {
        self.kind(ModuleKind::Event, module)
    }

    pub fn command(&mut self, module: Module) -> &mut Self {
        self.kind(ModuleKind::Command, module)
    }

    pub fn kind(&mut self, kind: ModuleKind, module: Module) -> &mut Self {
        self.module(kind.as_str(), module)
    }

    /// Registers a module under an arbitrary name, reachable through
    /// [`AutoloadContext::import_module`](super::AutoloadContext::import_module).
    pub fn module(&mut self, name: &str, module: Module) -> &mut Self {
        let path = self.registry.resolver.resolve(&self.subapp, Some(name));
        self.registry.insert(path, module);
        self
    }
}

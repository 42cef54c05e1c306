use crate::command::Manager;
use crate::server::{HostApp, HostState};
use fxhash::FxHashMap;
use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tessera_domain::constants::{MANAGER, ON_INSTALL, ON_SHUTDOWN, ON_STARTUP, ROUTER};
use utoipa_axum::router::OpenApiRouter;

/// Route collection a subapp exposes under the `router` export.
pub type SubappRouter = OpenApiRouter<HostState>;

/// Future returned by lifecycle hooks.
pub type HookFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// Synchronous hook run once, while the subapp is being loaded.
#[derive(Clone)]
pub struct InstallHook(Arc<dyn Fn(&mut HostApp) -> anyhow::Result<()> + Send + Sync>);

impl InstallHook {
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(&mut HostApp) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self(Arc::new(hook))
    }

    /// Runs the hook against the host.
    ///
    /// # Errors
    /// Returns whatever the hook returns.
    pub fn call(&self, host: &mut HostApp) -> anyhow::Result<()> {
        (self.0)(host)
    }
}

impl fmt::Debug for InstallHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InstallHook")
    }
}

/// Asynchronous startup or shutdown hook, invoked later by the host.
#[derive(Clone)]
pub struct LifecycleHook(Arc<dyn Fn() -> HookFuture + Send + Sync>);

impl LifecycleHook {
    pub fn new<F, Fut>(hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self(Arc::new(move || Box::pin(hook())))
    }

    #[must_use]
    pub fn call(&self) -> HookFuture {
        (self.0)()
    }

    /// Whether both handles point at the same hook.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for LifecycleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LifecycleHook")
    }
}

/// A value a module exports, tagged with the capability it provides.
///
/// The autoloader checks a module's contract by matching on the variant, so a module can only
/// satisfy a role by exporting the right capability under the right name.
#[derive(Clone)]
pub enum Export {
    /// Mountable route collection.
    Router(SubappRouter),
    /// Command source.
    Manager(Manager),
    /// Callable taking the host application.
    Install(InstallHook),
    /// Callable producing a future, for startup and shutdown.
    Lifecycle(LifecycleHook),
    /// Plain data with no capability.
    Value(serde_json::Value),
}

impl Export {
    /// Name of the capability, reported when a contract check fails.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Router(_) => "Router",
            Self::Manager(_) => "Manager",
            Self::Install(_) => "InstallHook",
            Self::Lifecycle(_) => "LifecycleHook",
            Self::Value(_) => "Value",
        }
    }
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manager(manager) => f.debug_tuple("Manager").field(manager).finish(),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            other => f.write_str(other.type_name()),
        }
    }
}

/// A subapp module: a set of named exports.
#[derive(Debug, Clone, Default)]
pub struct Module {
    exports: FxHashMap<Cow<'static, str>, Export>,
}

impl Module {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an export.
    #[must_use]
    pub fn with(mut self, name: impl Into<Cow<'static, str>>, export: Export) -> Self {
        self.exports.insert(name.into(), export);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Export> {
        self.exports.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.exports.keys().map(AsRef::as_ref)
    }

    /// A route module exporting `router`.
    #[must_use]
    pub fn router(router: SubappRouter) -> Self {
        Self::new().with(ROUTER, Export::Router(router))
    }

    /// A command module exporting `manager`.
    #[must_use]
    pub fn manager(manager: Manager) -> Self {
        Self::new().with(MANAGER, Export::Manager(manager))
    }

    /// Adds the `on_install` export.
    #[must_use]
    pub fn on_install<F>(self, hook: F) -> Self
    where
        F: Fn(&mut HostApp) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.with(ON_INSTALL, Export::Install(InstallHook::new(hook)))
    }

    /// Adds the `on_startup` export.
    #[must_use]
    pub fn on_startup<F, Fut>(self, hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.with(ON_STARTUP, Export::Lifecycle(LifecycleHook::new(hook)))
    }

    /// Adds the `on_shutdown` export.
    #[must_use]
    pub fn on_shutdown<F, Fut>(self, hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.with(ON_SHUTDOWN, Export::Lifecycle(LifecycleHook::new(hook)))
    }
}

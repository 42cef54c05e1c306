//! Everyday types for subapp crates and hosts.
//!
//! Error context traits (`AutoloadErrorExt`, `CliErrorExt`, ...) are not re-exported here;
//! import them from their modules by name.

pub use crate::autoload::{
    AutoloadContext, AutoloadError, Autoloader, AutoloaderOptions, Export,
    InstallHook, LifecycleHook, LoadEvent, LoadReport, Module, ModulePath, ModuleRegistry,
    ModuleResolver, SubappRegistration, SubappRouter, mode_from_env,
};
pub use crate::command::{
    Action, Argument, Cli, CliBuilder, CliError, CollisionPolicy, Command, CommandArgs, Dispatch,
    Manager, Metadata,
};
pub use crate::config::{ConfigError, Settings};
pub use crate::server::{HostApp, HostError, HostState, HostStateError};
pub use tessera_domain::command::{ArgValue, ValueType};
pub use tessera_domain::module::{Mode, ModuleKind};
pub use crate::action;

//! Kernel of the subapp platform.
//!
//! A *subapp* is a self-contained feature module that may provide up to three modules:
//! a **route** module (a mountable router), an **event** module (install/startup/shutdown
//! hooks) and a **command** module (a [`Manager`](command::Manager) of CLI actions).
//! Subapps register their modules in a [`ModuleRegistry`](autoload::ModuleRegistry) at
//! process start; the [`Autoloader`](autoload::Autoloader) then wires them into a
//! [`HostApp`](server::HostApp) (serve mode) or collects their managers so the
//! [`CliBuilder`](command::CliBuilder) can expose them as subcommands (manage mode).
//!
//! ## Serve mode
//! ```rust,ignore
//! use tessera_kernel::prelude::*;
//!
//! let mut registry = ModuleRegistry::default();
//! tessera_site::register(&mut registry)?;
//!
//! let mut host = HostApp::new();
//! let autoloader = Autoloader::builder(registry).main_subapp("site").build(&mut host)?;
//! assert_eq!(autoloader.mode(), Mode::Serve);
//! ```
//!
//! ## Manage mode
//! ```rust,ignore
//! let autoloader = Autoloader::builder(registry).mode(Mode::Manage).build(&mut host)?;
//! let cli = autoloader.cli("manager")?;
//! cli.dispatch(std::env::args_os(), std::env::current_dir()?)?;
//! ```

pub mod autoload;
pub mod command;
pub mod config;
pub mod prelude;
pub mod server;

pub use tessera_domain as domain;

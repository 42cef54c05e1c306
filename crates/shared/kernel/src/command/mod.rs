//! Command registries and the command line built from them.
//!
//! Subapps describe their commands with a [`Manager`]; in manage mode the autoloader
//! collects every manager and [`CliBuilder`] turns them into a `clap` parser with one
//! subcommand per command plus a dispatch table.

mod action;
mod args;
mod cli;
mod registry;

#[doc(hidden)]
pub use action::action_ident;
pub use action::Action;
pub use args::CommandArgs;
pub use cli::{Cli, CliBuilder, CliError, CliErrorExt, CollisionPolicy, Dispatch};
pub use registry::{Argument, Command, CommandBuilder, Manager, Metadata};

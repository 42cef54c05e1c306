//! The host application subapps are wired into.

mod health;
mod host;
mod router;
mod state;

pub use host::{HostApp, HostError, HostErrorExt};
pub use router::system_router;
pub use state::{HostState, HostStateBuilder, HostStateError, HostStateErrorExt, HostStateInner};

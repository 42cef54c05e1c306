//! Billing subapp.
//!
//! Ships an event module only: it has no routes and no commands, so the autoloader
//! records a skipped route module for it in serve mode and ignores it in manage mode.

use tessera_kernel::autoload::{Module, ModuleRegistry};
use tracing::info;

pub const NAME: &str = "billing";

const REDIS_PREFIX: &str = "redis.prefix";

pub fn register(registry: &mut ModuleRegistry) {
    registry.subapp(NAME).event(event());
}

fn event() -> Module {
    Module::new()
        .on_install(|host| {
            let prefix: String = host.context()?.config(REDIS_PREFIX, String::new())?;
            info!(%prefix, "Billing installed");
            Ok(())
        })
        .on_startup(|| async {
            info!("Billing started");
            Ok(())
        })
        .on_shutdown(|| async {
            info!("Billing stopped");
            Ok(())
        })
}

use tessera_kernel::autoload::Module;
use tessera_kernel::domain::constants::PROJECT_NAME;
use tracing::info;

pub(crate) fn module() -> Module {
    Module::new()
        .on_install(|host| {
            let project: String = host.context()?.config(PROJECT_NAME, String::from("tessera"))?;
            info!(%project, "Site installed");
            Ok(())
        })
        .on_startup(|| async {
            info!("Site started");
            Ok(())
        })
        .on_shutdown(|| async {
            info!("Site stopped");
            Ok(())
        })
}

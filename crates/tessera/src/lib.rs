//! Facade crate for Tessera applications.
//! Re-exports domain/kernel primitives and registers every compiled-in subapp.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Call [`registry`] once at process start and hand the result to the autoloader.
//! - Add a line to [`register_all`] for every new subapp crate.

pub use tessera_domain as domain;
pub use tessera_kernel as kernel;
pub use tessera_kernel::prelude;

use tessera_kernel::autoload::{ModuleRegistry, ModuleResolver};
pub use tessera_site::SiteError;

/// Subapp crates for runtime introspection.
pub mod subapps {
    #[cfg(feature = "billing")]
    pub use tessera_billing as billing;
    pub use tessera_site as site;

    /// Subapps compiled into this build, in registration order.
    pub const ENABLED: &[&str] = &[
        tessera_site::NAME,
        #[cfg(feature = "billing")]
        tessera_billing::NAME,
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Registry holding every compiled-in subapp under the default namespace root.
///
/// # Errors
/// Returns [`SiteError`] if the main subapp's settings cannot be loaded.
pub fn registry() -> Result<ModuleRegistry, SiteError> {
    registry_with(ModuleResolver::default())
}

/// Same as [`registry`] with a custom resolver (namespace root).
///
/// # Errors
/// Returns [`SiteError`] if the main subapp's settings cannot be loaded.
pub fn registry_with(resolver: ModuleResolver) -> Result<ModuleRegistry, SiteError> {
    let mut registry = ModuleRegistry::new(resolver);
    register_all(&mut registry)?;
    tracing::debug!(subapps = ?registry.subapps(), "Subapps registered");
    Ok(registry)
}

/// Registers every compiled-in subapp into an existing registry.
///
/// # Errors
/// Returns [`SiteError`] if the main subapp's settings cannot be loaded.
pub fn register_all(registry: &mut ModuleRegistry) -> Result<(), SiteError> {
    tessera_site::register(registry)?;

    #[cfg(feature = "billing")]
    tessera_billing::register(registry);

    Ok(())
}

//! Naming conventions every subapp follows.

/// Environment variable selecting the manage (CLI) mode when truthy.
pub const MODE_ENV: &str = "AUTOLOADER_MANAGER_MODE";

/// Subapp loaded first and queried for configuration.
pub const DEFAULT_MAIN_SUBAPP: &str = "site";
/// First segment of every resolved module path.
pub const DEFAULT_NAMESPACE_ROOT: &str = "app";

/// Module name of a subapp's configuration surface.
pub const CONFIG_MODULE: &str = "config";
/// Ordered list of extra subapps to load, read from the main subapp's config.
pub const INSTALLED_SUBAPPS: &str = "installed_subapps";
pub const PROJECT_NAME: &str = "project_name";

// Export names looked up inside subapp modules.
pub const ROUTER: &str = "router";
pub const MANAGER: &str = "manager";
pub const ON_INSTALL: &str = "on_install";
pub const ON_STARTUP: &str = "on_startup";
pub const ON_SHUTDOWN: &str = "on_shutdown";

/// Metadata keys starting with this prefix configure a command instead of declaring an argument.
pub const RESERVED_PREFIX: char = '_';
pub const META_NAME: &str = "_name";
pub const META_HELP: &str = "_help";

/// `OpenAPI` tag of the host's own endpoints.
pub const SYSTEM_TAG: &str = "System";

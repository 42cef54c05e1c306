use crate::error::{SiteError, SiteErrorExt};
use tessera_kernel::config::Settings;

/// Defaults compiled into the binary.
pub const DEFAULTS: &str = include_str!("../config.toml");

/// Optional file (any format `config` understands) layered over the defaults.
pub const OVERRIDE_PATH: &str = "config/site";

/// Site settings: embedded defaults, then `config/site.*`, then `TESSERA__*` variables.
///
/// # Errors
/// Returns [`SiteError::Config`] if the defaults or the override file are malformed.
pub fn settings() -> Result<Settings, SiteError> {
    Settings::load(DEFAULTS, Some(OVERRIDE_PATH)).context("Loading site settings")
}

use config::{Config, Environment, File, FileFormat};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tessera_domain::constants::INSTALLED_SUBAPPS;
use tracing::{info, warn};

/// Prefix of environment variables overriding file-based settings.
pub const ENV_PREFIX: &str = "TESSERA";
const ENV_SEPARATOR: &str = "__";

/// Custom error type for config loading.
#[tessera_derive::tessera_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .convert_case(config::Case::Snake)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key(INSTALLED_SUBAPPS)
}

/// Loads a typed configuration from a file layered with environment overrides.
///
/// 1. **Base File**: the given path, or `server` in the working directory (any extension
///    `config` understands, e.g. `server.toml`).
/// 2. **Environment Overrides**: variables prefixed with `TESSERA__`; nested keys use a
///    double underscore (`TESSERA__SERVER__PORT` maps to `server.port`).
///
/// # Errors
/// Returns [`ConfigError::Config`] if the file is missing or does not match `T`.
///
/// # Example
/// ```rust,no_run
/// use tessera_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path = path.map_or_else(|| PathBuf::from("server"), |p| p.as_ref().to_path_buf());

    info!("Loading config from {}", effective_path.display());

    let config = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(environment())
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

/// Key/value settings exposed by a subapp's `config` module.
///
/// Lookups take dotted keys (`redis.prefix`, `connection_strings.redis`) and never fail:
/// a missing segment anywhere along the path yields `None` (or the supplied default).
#[derive(Debug, Clone, Default)]
pub struct Settings {
    inner: Arc<Config>,
}

impl Settings {
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { inner: Arc::new(config) }
    }

    /// Parses settings from a TOML document, without environment overrides.
    ///
    /// # Errors
    /// Returns [`ConfigError::Config`] if the document is not valid TOML.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .context("Failed to parse settings")?;
        Ok(Self::from_config(config))
    }

    /// Layers embedded defaults, an optional file and `TESSERA__` environment overrides.
    ///
    /// # Errors
    /// Returns [`ConfigError::Config`] if the defaults or the file cannot be parsed.
    pub fn load(defaults: &str, path: Option<impl AsRef<Path>>) -> Result<Self, ConfigError> {
        let mut builder =
            Config::builder().add_source(File::from_str(defaults, FileFormat::Toml));
        if let Some(path) = path {
            builder = builder.add_source(File::from(path.as_ref()).required(false));
        }

        let config =
            builder.add_source(environment()).build().context("Failed to build settings")?;
        Ok(Self::from_config(config))
    }

    /// Looks up a dotted key.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.inner.get::<T>(key) {
            Ok(value) => Some(value),
            Err(config::ConfigError::NotFound(_)) => None,
            Err(error) => {
                warn!(key, %error, "Ignoring malformed setting");
                None
            },
        }
    }

    /// Looks up a dotted key, falling back to `default` when it cannot be resolved.
    #[must_use]
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.get::<config::Value>(key).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    const SITE: &str = r#"
project_name = "starter"
installed_subapps = ["billing", "site"]

[connection_strings]
redis = "redis://localhost:6379"

[redis]
prefix = "starter:"
"#;

    #[test]
    fn dotted_lookup_walks_nested_tables() {
        let settings = Settings::from_toml(SITE).unwrap();
        assert_eq!(settings.get::<String>("redis.prefix").as_deref(), Some("starter:"));
        assert_eq!(
            settings.get::<String>("connection_strings.redis").as_deref(),
            Some("redis://localhost:6379")
        );
        assert_eq!(
            settings.get::<Vec<String>>(INSTALLED_SUBAPPS),
            Some(vec!["billing".to_owned(), "site".to_owned()])
        );
    }

    #[test]
    fn missing_segments_fall_back_to_default() {
        let settings = Settings::from_toml(SITE).unwrap();
        assert_eq!(settings.get::<String>("redis.missing"), None);
        assert_eq!(settings.get::<String>("nothing.here.at_all"), None);
        assert_eq!(settings.get_or("database.url", "sqlite://".to_owned()), "sqlite://");
        assert!(!settings.contains("database"));
        assert!(settings.contains("redis"));
    }

    #[test]
    fn mistyped_values_fall_back_to_default() {
        let settings = Settings::from_toml(SITE).unwrap();
        assert_eq!(settings.get_or::<u16>("project_name", 7), 7);
    }

    #[test]
    fn empty_settings_resolve_nothing() {
        let settings = Settings::default();
        assert_eq!(settings.get_or::<Vec<String>>(INSTALLED_SUBAPPS, Vec::new()), Vec::<String>::new());
    }

    #[test]
    fn invalid_toml_is_reported() {
        let err = Settings::from_toml("project_name = ").expect_err("invalid toml");
        assert!(matches!(err, ConfigError::Config { context: Some(_), .. }));
    }

    #[test]
    #[serial]
    fn load_reads_file_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("site.toml");
        std::fs::write(&file, "project_name = \"override\"\n").unwrap();

        let settings = Settings::load(SITE, Some(&file)).unwrap();
        assert_eq!(settings.get::<String>("project_name").as_deref(), Some("override"));
        assert_eq!(settings.get::<String>("redis.prefix").as_deref(), Some("starter:"));

        let missing = Settings::load(SITE, Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(missing.get::<String>("project_name").as_deref(), Some("starter"));
    }

    #[test]
    #[serial]
    fn load_config_deserializes_typed_structs() {
        #[derive(serde::Deserialize)]
        struct Listener {
            port: u16,
            extras: HashMap<String, String>,
        }

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("server.toml");
        std::fs::write(&file, "port = 8081\n[extras]\nmode = \"dev\"\n").unwrap();

        let cfg: Listener = load_config(Some(&file)).unwrap();
        assert_eq!(cfg.port, 8081);
        assert_eq!(cfg.extras.get("mode").map(String::as_str), Some("dev"));

        let missing = load_config::<Listener>(Some(dir.path().join("nope.toml")));
        assert!(missing.is_err());
    }
}

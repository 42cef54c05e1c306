use crate::constants::{DEFAULT_MAIN_SUBAPP, DEFAULT_NAMESPACE_ROOT};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Top-level configuration of the server application.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfigInner {
    pub server: ServerConfig,
    pub autoload: AutoloadConfig,
    pub docs: DocsConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into handlers.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(flatten, default)]
    inner: Arc<AppConfigInner>,
}

impl Deref for AppConfig {
    type Target = AppConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for AppConfig {
    fn deref_mut(&mut self) -> &mut AppConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    /// Seconds granted to in-flight requests once shutdown starts.
    pub grace_period: u64,
}

/// Which subapp boots first and how module paths are named.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AutoloadConfig {
    pub main_subapp: String,
    pub namespace_root: String,
}

/// Interactive API reference served next to the routes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    pub enabled: bool,
    pub path: String,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 8000, grace_period: 30 }
    }
}

impl Default for AutoloadConfig {
    fn default() -> Self {
        Self {
            main_subapp: DEFAULT_MAIN_SUBAPP.to_owned(),
            namespace_root: DEFAULT_NAMESPACE_ROOT.to_owned(),
        }
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self { enabled: true, path: "/api".to_owned() }
    }
}

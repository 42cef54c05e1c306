//! # Tessera Server
//!
//! Serve-mode host: autoloads the route and event modules of every installed subapp,
//! runs their startup hooks, serves them with `Axum` and runs their shutdown hooks once
//! the listener has drained.
//!
//! ## Example
//! ```no_run
//! use tessera_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(4583)
//!         .build()?
//!         .run()
//!         .await
//! }
//! ```

mod router;

use anyhow::{Context, Result};
use axum::Router;
use axum_server::Handle;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tessera::domain::config::AppConfig;
use tessera::prelude::*;
use tokio::signal;
use tracing::{error, info, warn};

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: AppConfig,
    registry: Option<ModuleRegistry>,
    mode: Option<Mode>,
}

impl ServerBuilder {
    /// Set up the server's configuration.
    pub fn config(mut self, cfg: AppConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    /// Replaces the compiled-in subapps with a hand-built registry.
    pub fn registry(mut self, registry: ModuleRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Pins the mode instead of reading the manager-mode flag from the environment.
    pub const fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Consumes the builder and autoloads the subapps.
    ///
    /// # Process
    /// 1. Registers the compiled-in subapps under the configured namespace root
    /// 2. Autoloads the main subapp, then every subapp it lists as installed
    /// 3. Constructs the handler state around the autoload context
    ///
    /// # Errors
    /// Returns an error if:
    /// * The main subapp's settings are malformed
    /// * The main subapp registered no config module
    /// * An install hook fails
    pub fn build(self) -> Result<Server> {
        let address = SocketAddr::new(self.cfg.server.address, self.cfg.server.port);
        info!(address = %address, main_subapp = %self.cfg.autoload.main_subapp, "Initializing server");

        let registry = match self.registry {
            Some(registry) => registry,
            None => tessera::registry_with(ModuleResolver::new(self.cfg.autoload.namespace_root.clone()))
                .context("Failed to register subapps")?,
        };

        let mut host = HostApp::new();
        let mut autoloader = Autoloader::builder(registry)
            .main_subapp(self.cfg.autoload.main_subapp.clone())
            .default_mode(Mode::Serve);
        if let Some(mode) = self.mode {
            autoloader = autoloader.mode(mode);
        }
        let autoloader = autoloader.build(&mut host).context("Autoloading subapps failed")?;
        if autoloader.mode() == Mode::Manage {
            warn!("Manager mode is set; no routes or hooks were loaded");
        }

        let state = HostState::builder()
            .config(self.cfg)
            .context(Arc::clone(autoloader.context()))
            .build()
            .context("Failed to finalize host state")?;
        Ok(Server { host, autoloader, state })
    }
}

/// A fully initialized server instance ready to run.
///
/// This struct is returned by [`ServerBuilder::build`] and owns the host application
/// the subapps were loaded into.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    host: HostApp,
    autoloader: Autoloader,
    state: HostState,
}

impl Server {
    /// Returns a new [`ServerBuilder`] to configure the server.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Runs the startup hooks, serves until a shutdown signal arrives, then runs the
    /// shutdown hooks.
    ///
    /// # Errors
    /// Returns an error if a startup hook fails or the server fails to bind to the
    /// configured address.
    pub async fn run(mut self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);

        self.host.startup().await.context("Startup hooks failed")?;

        let app = self.router();
        info!(address = %address, routes = self.host.mounted_routes(), "Starting HTTP server on http://{address}");

        // Set up Graceful Shutdown
        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();
        let grace_period = Duration::from_secs(cfg.server.grace_period);

        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_handle.graceful_shutdown(Some(grace_period));
        });

        let served = axum_server::bind(address).handle(handle).serve(app.into_make_service()).await;

        self.host.shutdown().await;
        served.context("HTTP server failed")?;

        info!("Server shutdown complete");
        Ok(())
    }

    /// Builds the axum router from the mounted routes.
    ///
    /// Takes the route table out of the host, so it yields the subapp routes only once.
    pub fn router(&mut self) -> Router {
        router::init(&mut self.host, self.state.clone())
    }

    #[must_use]
    pub const fn host(&self) -> &HostApp {
        &self.host
    }

    #[must_use]
    pub const fn autoloader(&self) -> &Autoloader {
        &self.autoloader
    }

    /// Returns a reference to the handler state.
    #[must_use]
    pub const fn state(&self) -> &HostState {
        &self.state
    }
}

/// Listens for shutdown signals (Ctrl+C, SIGTERM).
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => {
            res.context("Ctrl+C signal received")?;
        },
        res = terminate => {
            res.context("SIGTERM signal received")?;
        },
    }

    Ok(())
}

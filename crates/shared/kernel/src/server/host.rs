use super::{HostState, system_router};
use crate::autoload::{AutoloadContext, AutoloadError, LifecycleHook, SubappRouter};
use axum::Router;
use std::borrow::Cow;
use std::sync::Arc;
use tessera_domain::config::DocsConfig;
use tracing::{debug, error, info};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[tessera_derive::tessera_error]
pub enum HostError {
    #[error("Startup hook failed{}: {source}", format_context(.context))]
    Startup { source: Box<dyn std::error::Error + Send + Sync>, context: Option<Cow<'static, str>> },
}

#[derive(OpenApi)]
struct ApiDoc;

/// Route table and lifecycle hook lists the autoloader fills.
///
/// Starts with the system router (`GET /health`). Hooks are kept in registration order,
/// which is subapp load order.
pub struct HostApp {
    router: SubappRouter,
    startup: Vec<LifecycleHook>,
    shutdown: Vec<LifecycleHook>,
    context: Option<Arc<AutoloadContext>>,
    mounted: usize,
}

impl Default for HostApp {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HostApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostApp")
            .field("mounted", &self.mounted)
            .field("startup", &self.startup.len())
            .field("shutdown", &self.shutdown.len())
            .field("context", &self.context.is_some())
            .finish_non_exhaustive()
    }
}

impl HostApp {
    #[must_use]
    pub fn new() -> Self {
        Self {
            router: OpenApiRouter::with_openapi(ApiDoc::openapi()).merge(system_router()),
            startup: Vec::new(),
            shutdown: Vec::new(),
            context: None,
            mounted: 0,
        }
    }

    /// Merges a subapp router into the route table.
    ///
    /// # Panics
    /// Panics like [`axum::Router::merge`] when two subapps claim the same path and method.
    pub fn mount_routes(&mut self, router: SubappRouter) {
        let current = std::mem::replace(&mut self.router, OpenApiRouter::new());
        self.router = current.merge(router);
        self.mounted += 1;
    }

    pub fn append_startup_hook(&mut self, hook: LifecycleHook) {
        self.startup.push(hook);
    }

    pub fn append_shutdown_hook(&mut self, hook: LifecycleHook) {
        self.shutdown.push(hook);
    }

    #[must_use]
    pub fn startup_hooks(&self) -> &[LifecycleHook] {
        &self.startup
    }

    #[must_use]
    pub fn shutdown_hooks(&self) -> &[LifecycleHook] {
        &self.shutdown
    }

    /// Number of subapp routers merged so far.
    #[must_use]
    pub const fn mounted_routes(&self) -> usize {
        self.mounted
    }

    /// The autoload context, available from the first module load on.
    ///
    /// # Errors
    /// Returns [`AutoloadError::Uninitialized`] before the autoloader attached it.
    pub fn context(&self) -> Result<&Arc<AutoloadContext>, AutoloadError> {
        self.context.as_ref().ok_or(AutoloadError::Uninitialized {
            context: Some("host application has no autoload context".into()),
        })
    }

    pub(crate) fn attach(&mut self, context: Arc<AutoloadContext>) {
        self.context = Some(context);
    }

    /// Runs startup hooks in registration order, stopping at the first failure.
    ///
    /// # Errors
    /// Returns [`HostError::Startup`] with the failing hook's error.
    pub async fn startup(&self) -> Result<(), HostError> {
        for (index, hook) in self.startup.iter().enumerate() {
            debug!(index, "Running startup hook");
            hook.call().await.map_err(|source| HostError::Startup {
                source: source.into(),
                context: Some(format!("hook #{index}").into()),
            })?;
        }
        info!(hooks = self.startup.len(), "Startup hooks completed");
        Ok(())
    }

    /// Runs shutdown hooks in registration order. Failures are logged and the remaining
    /// hooks still run.
    pub async fn shutdown(&self) {
        for (index, hook) in self.shutdown.iter().enumerate() {
            if let Err(e) = hook.call().await {
                error!(index, "Shutdown hook failed: {e:#}");
            }
        }
        info!(hooks = self.shutdown.len(), "Shutdown hooks completed");
    }

    /// Turns the route table into an axum router, serving the API reference when enabled.
    ///
    /// The host keeps its hooks, so [`shutdown`](Self::shutdown) can still run once the
    /// server stops. Routes mounted afterwards start from an empty table.
    pub fn build_router(&mut self, state: HostState, docs: &DocsConfig) -> Router {
        // Separate the OpenAPI routes and the API documentation object
        let (routes, api_doc) =
            std::mem::replace(&mut self.router, OpenApiRouter::new()).split_for_parts();

        let routes = if docs.enabled {
            routes.merge(Scalar::with_url(docs.path.clone(), api_doc))
        } else {
            routes
        };
        routes.with_state(state)
    }
}

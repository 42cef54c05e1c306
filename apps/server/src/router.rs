use axum::Router;
use tessera::prelude::{HostApp, HostState};
use tower_http::trace::TraceLayer;

/// Final axum router: mounted subapp routes, API reference and request tracing.
pub(crate) fn init(host: &mut HostApp, state: HostState) -> Router {
    let docs = state.config.docs.clone();
    host.build_router(state, &docs).layer(TraceLayer::new_for_http())
}

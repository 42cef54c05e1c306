use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;
use std::sync::Arc;
use tessera_kernel::autoload::{AutoloadContext, SubappRouter};
use tessera_kernel::domain::constants::{INSTALLED_SUBAPPS, PROJECT_NAME};
use tracing::error;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

const TAG: &str = "Site";

/// Project overview
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct SiteInfo {
    /// Project name
    project_name: String,
    /// Subapps loaded after the main one
    installed_subapps: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = OK, description = "Project overview", body = SiteInfo),
        (status = INTERNAL_SERVER_ERROR, description = "Settings unavailable"),
    ),
    tag = TAG,
)]
pub(crate) async fn index(
    State(context): State<Arc<AutoloadContext>>,
) -> Result<Json<SiteInfo>, StatusCode> {
    let settings = context.settings().map_err(|e| {
        error!("Site settings unavailable: {e}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(SiteInfo {
        project_name: settings.get_or(PROJECT_NAME, String::new()),
        installed_subapps: settings.get_or(INSTALLED_SUBAPPS, Vec::new()),
    }))
}

pub(crate) fn router() -> SubappRouter {
    OpenApiRouter::new().routes(routes!(index))
}

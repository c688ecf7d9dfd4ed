//! Navigation route handlers.
//!
//! Exposes the previous/next engine over HTTP for detail pages: single
//! neighbors as JSON, and the combined bundle either as JSON or rendered
//! through a template when one is requested and templates are configured.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Resource, ResourceType};
use crate::nav::{BundleOptions, ExplicitQuery, SessionQueryStore, UiScope};
use crate::state::AppState;

/// Query parameters shared by the navigation endpoints.
#[derive(Debug, Deserialize)]
pub struct NavParams {
    /// Query source hint: "session", "setting", or "url".
    pub source: Option<String>,

    /// URL-encoded explicit query, used with source=url (or by itself).
    pub query: Option<String>,

    /// Site scope; absent means admin scope.
    pub site: Option<Uuid>,

    /// Presentation template identifier for the bundle endpoint.
    pub template: Option<String>,

    /// Include a link back to the last browse view.
    pub back_link: Option<bool>,

    /// Return raw data even when a template is available.
    pub raw: Option<bool>,
}

impl NavParams {
    fn scope(&self) -> UiScope {
        self.site.map(UiScope::Public).unwrap_or(UiScope::Admin)
    }

    fn explicit(&self) -> Option<ExplicitQuery> {
        self.query.clone().map(ExplicitQuery::Encoded)
    }
}

/// Response wrapping a single resolved neighbor.
#[derive(Debug, Serialize)]
pub struct NeighborResponse {
    pub resource: Option<Resource>,
}

/// Parse the path's resource type segment.
///
/// An unknown type is a caller/integration bug, surfaced as a configuration
/// error rather than swallowed.
fn parse_type(raw: &str) -> AppResult<ResourceType> {
    ResourceType::from_name(raw)
        .ok_or_else(|| AppError::Configuration(format!("unknown resource type: {raw}")))
}

/// Load the resource being viewed, 404 when it no longer exists.
async fn load_current(state: &AppState, resource_type: ResourceType, id: Uuid) -> AppResult<Resource> {
    state
        .reader()
        .read(resource_type, id)
        .await?
        .ok_or(AppError::NotFound)
}

/// GET /admin/nav/{resource_type}/{id}/previous
async fn previous(
    State(state): State<AppState>,
    session: Session,
    Path((type_name, id)): Path<(String, Uuid)>,
    Query(params): Query<NavParams>,
) -> AppResult<Json<NeighborResponse>> {
    let resource_type = parse_type(&type_name)?;
    let resource = load_current(&state, resource_type, id).await?;
    let queries = SessionQueryStore::new(session);

    let resource = state
        .navigator()
        .previous_of(
            &resource,
            params.scope(),
            &queries,
            params.source.as_deref(),
            params.explicit(),
        )
        .await?;
    Ok(Json(NeighborResponse { resource }))
}

/// GET /admin/nav/{resource_type}/{id}/next
async fn next(
    State(state): State<AppState>,
    session: Session,
    Path((type_name, id)): Path<(String, Uuid)>,
    Query(params): Query<NavParams>,
) -> AppResult<Json<NeighborResponse>> {
    let resource_type = parse_type(&type_name)?;
    let resource = load_current(&state, resource_type, id).await?;
    let queries = SessionQueryStore::new(session);

    let resource = state
        .navigator()
        .next_of(
            &resource,
            params.scope(),
            &queries,
            params.source.as_deref(),
            params.explicit(),
        )
        .await?;
    Ok(Json(NeighborResponse { resource }))
}

/// GET /admin/nav/{resource_type}/{id}
///
/// The combined bundle. Rendered HTML when a template is requested and a
/// template directory is configured, JSON otherwise.
async fn bundle(
    State(state): State<AppState>,
    session: Session,
    Path((type_name, id)): Path<(String, Uuid)>,
    Query(params): Query<NavParams>,
) -> AppResult<Response> {
    let resource_type = parse_type(&type_name)?;
    let resource = load_current(&state, resource_type, id).await?;
    let queries = SessionQueryStore::new(session);

    let options = BundleOptions {
        source_hint: params.source.clone(),
        explicit: params.explicit(),
        template: params.template.clone(),
        include_back_link: params.back_link.unwrap_or(false),
        raw: params.raw.unwrap_or(false),
    };

    let bundle = state
        .navigator()
        .bundle_of(&resource, params.scope(), &queries, options)
        .await?;

    if let Some(template) = bundle.template.as_deref() {
        if let Some(tera) = state.templates() {
            let context = tera::Context::from_serialize(&bundle)
                .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;
            let html = tera
                .render(template, &context)
                .map_err(|e| AppError::BadRequest(format!("template render failed: {e}")))?;
            return Ok(Html(html).into_response());
        }
    }

    Ok(Json(bundle).into_response())
}

/// Create the navigation router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/nav/{resource_type}/{id}/previous", get(previous))
        .route("/admin/nav/{resource_type}/{id}/next", get(next))
        .route("/admin/nav/{resource_type}/{id}", get(bundle))
}

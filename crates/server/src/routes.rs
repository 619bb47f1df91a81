use axum::{
    middleware,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::pagination::{ListOptions, Pagination, Sort};

use crate::auth::{require_credential, AppState};
use crate::errors::{ApiError, ErrorKind};
use crate::metrics::{metrics_handler, track_metrics};
use crate::openapi::ApiDoc;

pub mod conditions;
pub mod groups;
pub mod indicators;
pub mod phases;
pub mod topics;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

/// `?expand=a,b` on retrieve endpoints.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExpandQuery {
    /// Comma separated relations to embed
    pub expand: Option<String>,
}

/// Validate the paging and sort parameters shared by list endpoints.
pub(crate) fn list_options(page: Option<u64>, page_size: Option<u64>, sort: Option<&str>) -> Result<ListOptions, ApiError> {
    let pagination = Pagination::from_request(page, page_size)?;
    let sort = match sort {
        Some(raw) => Some(
            Sort::parse(raw).ok_or_else(|| ApiError::validation("sort", "expected a field name, optionally prefixed with '-'"))?,
        ),
        None => None,
    };
    Ok(ListOptions::new(pagination, sort))
}

async fn not_found() -> ApiError {
    ApiError::new(ErrorKind::NotFound, "no such route")
}

async fn method_not_allowed() -> ApiError {
    ApiError::new(ErrorKind::MethodNotAllowed, "method not allowed on this route")
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/topics", get(topics::list).post(topics::create))
        .route("/topics/:id", get(topics::get).put(topics::replace).patch(topics::update).delete(topics::delete))
        .route("/groups", get(groups::list).post(groups::create))
        .route("/groups/:id", get(groups::get).put(groups::replace).patch(groups::update).delete(groups::delete))
        .route("/conditions", get(conditions::list).post(conditions::create))
        .route(
            "/conditions/:id",
            get(conditions::get).put(conditions::replace).patch(conditions::update).delete(conditions::delete),
        )
        .route(
            "/conditions/:id/indicators/:indicator_id",
            put(conditions::link_indicator).delete(conditions::unlink_indicator),
        )
        .route("/phases", get(phases::list).post(phases::create))
        .route("/phases/:id", get(phases::get).put(phases::replace).patch(phases::update).delete(phases::delete))
        .route("/indicators", get(indicators::list).post(indicators::create))
        .route(
            "/indicators/:id",
            get(indicators::get).put(indicators::replace).patch(indicators::update).delete(indicators::delete),
        )
        .route_layer(middleware::from_fn_with_state(state, require_credential))
}

/// Build the full application router: health, metrics, docs and the versioned API.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .nest("/api/v1", api_routes(state.clone()))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(track_metrics))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx at ERROR
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

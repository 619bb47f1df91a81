use axum::{extract::State, http::StatusCode};
use models::phase;
use serde::Deserialize;
use service::expand::Expansion;
use service::phase_service::{self, NewPhase, PhaseChanges, PhaseDetail, PhaseFilter};

use crate::auth::AppState;
use crate::envelope::{Created, Envelope};
use crate::errors::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::{list_options, ExpandQuery};

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PhaseListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    /// `id`, `position` or `title`
    pub sort: Option<String>,
    pub condition_id: Option<i32>,
}

#[utoipa::path(get, path = "/api/v1/phases", tag = "phases", params(PhaseListQuery), responses((status = 200, description = "Page of phases"), (status = 400, description = "Validation Error")))]
pub async fn list(State(state): State<AppState>, ApiQuery(q): ApiQuery<PhaseListQuery>) -> Result<Envelope<Vec<phase::Model>>, ApiError> {
    let opts = list_options(q.page, q.page_size, q.sort.as_deref())?;
    let filter = PhaseFilter { condition_id: q.condition_id };
    Ok(Envelope::page(phase_service::list_phases(state.storage.conn(), filter, &opts).await?))
}

#[utoipa::path(post, path = "/api/v1/phases", tag = "phases", request_body = crate::openapi::PhaseInputDoc, responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 409, description = "Unknown condition")))]
pub async fn create(State(state): State<AppState>, ApiJson(input): ApiJson<NewPhase>) -> Result<Created<phase::Model>, ApiError> {
    Ok(Created(phase_service::create_phase(state.storage.conn(), input).await?))
}

#[utoipa::path(get, path = "/api/v1/phases/{id}", tag = "phases", params(("id" = i32, Path, description = "Phase id"), ExpandQuery), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiQuery(q): ApiQuery<ExpandQuery>,
) -> Result<Envelope<PhaseDetail>, ApiError> {
    let expand = Expansion::parse(q.expand.as_deref(), phase_service::EXPANSIONS)?;
    Ok(Envelope::one(phase_service::get_phase_detail(state.storage.conn(), id, &expand).await?))
}

#[utoipa::path(put, path = "/api/v1/phases/{id}", tag = "phases", params(("id" = i32, Path, description = "Phase id")), request_body = crate::openapi::PhaseInputDoc, responses((status = 200, description = "Replaced"), (status = 404, description = "Not Found")))]
pub async fn replace(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<NewPhase>,
) -> Result<Envelope<phase::Model>, ApiError> {
    Ok(Envelope::one(phase_service::replace_phase(state.storage.conn(), id, input).await?))
}

#[utoipa::path(patch, path = "/api/v1/phases/{id}", tag = "phases", params(("id" = i32, Path, description = "Phase id")), request_body = crate::openapi::PhasePatchDoc, responses((status = 200, description = "Updated"), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(changes): ApiJson<PhaseChanges>,
) -> Result<Envelope<phase::Model>, ApiError> {
    Ok(Envelope::one(phase_service::update_phase(state.storage.conn(), id, changes).await?))
}

#[utoipa::path(delete, path = "/api/v1/phases/{id}", tag = "phases", params(("id" = i32, Path, description = "Phase id")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<i32>) -> Result<StatusCode, ApiError> {
    phase_service::delete_phase(state.storage.conn(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

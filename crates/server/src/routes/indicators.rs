use axum::{extract::State, http::StatusCode};
use models::indicator;
use serde::Deserialize;
use service::expand::Expansion;
use service::indicator_service::{self, IndicatorChanges, IndicatorDetail, IndicatorFilter, NewIndicator};

use crate::auth::AppState;
use crate::envelope::{Created, Envelope};
use crate::errors::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::{list_options, ExpandQuery};

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IndicatorListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub sort: Option<String>,
    /// Only indicators linked to this condition
    pub condition_id: Option<i32>,
}

#[utoipa::path(get, path = "/api/v1/indicators", tag = "indicators", params(IndicatorListQuery), responses((status = 200, description = "Page of indicators"), (status = 400, description = "Validation Error")))]
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<IndicatorListQuery>,
) -> Result<Envelope<Vec<indicator::Model>>, ApiError> {
    let opts = list_options(q.page, q.page_size, q.sort.as_deref())?;
    let filter = IndicatorFilter { condition_id: q.condition_id };
    Ok(Envelope::page(indicator_service::list_indicators(state.storage.conn(), filter, &opts).await?))
}

#[utoipa::path(post, path = "/api/v1/indicators", tag = "indicators", request_body = crate::openapi::IndicatorInputDoc, responses((status = 201, description = "Created"), (status = 400, description = "Validation Error")))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewIndicator>,
) -> Result<Created<indicator::Model>, ApiError> {
    Ok(Created(indicator_service::create_indicator(state.storage.conn(), input).await?))
}

#[utoipa::path(get, path = "/api/v1/indicators/{id}", tag = "indicators", params(("id" = i32, Path, description = "Indicator id"), ExpandQuery), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiQuery(q): ApiQuery<ExpandQuery>,
) -> Result<Envelope<IndicatorDetail>, ApiError> {
    let expand = Expansion::parse(q.expand.as_deref(), indicator_service::EXPANSIONS)?;
    Ok(Envelope::one(indicator_service::get_indicator_detail(state.storage.conn(), id, &expand).await?))
}

#[utoipa::path(put, path = "/api/v1/indicators/{id}", tag = "indicators", params(("id" = i32, Path, description = "Indicator id")), request_body = crate::openapi::IndicatorInputDoc, responses((status = 200, description = "Replaced"), (status = 404, description = "Not Found")))]
pub async fn replace(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<NewIndicator>,
) -> Result<Envelope<indicator::Model>, ApiError> {
    Ok(Envelope::one(indicator_service::replace_indicator(state.storage.conn(), id, input).await?))
}

#[utoipa::path(patch, path = "/api/v1/indicators/{id}", tag = "indicators", params(("id" = i32, Path, description = "Indicator id")), request_body = crate::openapi::IndicatorPatchDoc, responses((status = 200, description = "Updated"), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(changes): ApiJson<IndicatorChanges>,
) -> Result<Envelope<indicator::Model>, ApiError> {
    Ok(Envelope::one(indicator_service::update_indicator(state.storage.conn(), id, changes).await?))
}

#[utoipa::path(delete, path = "/api/v1/indicators/{id}", tag = "indicators", params(("id" = i32, Path, description = "Indicator id")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<i32>) -> Result<StatusCode, ApiError> {
    indicator_service::delete_indicator(state.storage.conn(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

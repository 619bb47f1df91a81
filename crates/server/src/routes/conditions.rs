use axum::{extract::State, http::StatusCode};
use models::condition;
use serde::Deserialize;
use service::condition_service::{self, ConditionChanges, ConditionDetail, ConditionFilter, NewCondition};
use service::expand::Expansion;

use crate::auth::AppState;
use crate::envelope::{Created, Envelope};
use crate::errors::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::{list_options, ExpandQuery};

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConditionListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    /// `id`, `name` or `topic_id`
    pub sort: Option<String>,
    pub topic_id: Option<i32>,
    pub group_id: Option<i32>,
}

#[utoipa::path(
    get, path = "/api/v1/conditions", tag = "conditions",
    params(ConditionListQuery),
    responses((status = 200, description = "Page of conditions"), (status = 400, description = "Validation Error"))
)]
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<ConditionListQuery>,
) -> Result<Envelope<Vec<condition::Model>>, ApiError> {
    let opts = list_options(q.page, q.page_size, q.sort.as_deref())?;
    let filter = ConditionFilter { topic_id: q.topic_id, group_id: q.group_id };
    Ok(Envelope::page(condition_service::list_conditions(state.storage.conn(), filter, &opts).await?))
}

#[utoipa::path(
    post, path = "/api/v1/conditions", tag = "conditions",
    request_body = crate::openapi::ConditionInputDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "Unknown topic, group or indicator")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewCondition>,
) -> Result<Created<condition::Model>, ApiError> {
    Ok(Created(condition_service::create_condition(state.storage.conn(), input).await?))
}

#[utoipa::path(
    get, path = "/api/v1/conditions/{id}", tag = "conditions",
    params(("id" = i32, Path, description = "Condition id"), ExpandQuery),
    responses((status = 200, description = "OK"), (status = 400, description = "Unknown expansion"), (status = 404, description = "Not Found"))
)]
pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiQuery(q): ApiQuery<ExpandQuery>,
) -> Result<Envelope<ConditionDetail>, ApiError> {
    let expand = Expansion::parse(q.expand.as_deref(), condition_service::EXPANSIONS)?;
    Ok(Envelope::one(condition_service::get_condition_detail(state.storage.conn(), id, &expand).await?))
}

#[utoipa::path(
    put, path = "/api/v1/conditions/{id}", tag = "conditions",
    params(("id" = i32, Path, description = "Condition id")),
    request_body = crate::openapi::ConditionInputDoc,
    responses((status = 200, description = "Replaced"), (status = 404, description = "Not Found"), (status = 409, description = "Unknown reference"))
)]
pub async fn replace(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<NewCondition>,
) -> Result<Envelope<condition::Model>, ApiError> {
    Ok(Envelope::one(condition_service::replace_condition(state.storage.conn(), id, input).await?))
}

#[utoipa::path(
    patch, path = "/api/v1/conditions/{id}", tag = "conditions",
    params(("id" = i32, Path, description = "Condition id")),
    request_body = crate::openapi::ConditionPatchDoc,
    responses((status = 200, description = "Updated"), (status = 404, description = "Not Found"), (status = 409, description = "Unknown reference"))
)]
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(changes): ApiJson<ConditionChanges>,
) -> Result<Envelope<condition::Model>, ApiError> {
    Ok(Envelope::one(condition_service::update_condition(state.storage.conn(), id, changes).await?))
}

/// Phases and indicator links go with the condition.
#[utoipa::path(
    delete, path = "/api/v1/conditions/{id}", tag = "conditions",
    params(("id" = i32, Path, description = "Condition id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<i32>) -> Result<StatusCode, ApiError> {
    condition_service::delete_condition(state.storage.conn(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put, path = "/api/v1/conditions/{id}/indicators/{indicator_id}", tag = "conditions",
    params(("id" = i32, Path, description = "Condition id"), ("indicator_id" = i32, Path, description = "Indicator id")),
    responses((status = 204, description = "Linked"), (status = 404, description = "Condition not found"), (status = 409, description = "Unknown indicator"))
)]
pub async fn link_indicator(
    State(state): State<AppState>,
    ApiPath((id, indicator_id)): ApiPath<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    condition_service::link_indicator(state.storage.conn(), id, indicator_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete, path = "/api/v1/conditions/{id}/indicators/{indicator_id}", tag = "conditions",
    params(("id" = i32, Path, description = "Condition id"), ("indicator_id" = i32, Path, description = "Indicator id")),
    responses((status = 204, description = "Unlinked"), (status = 404, description = "Link not found"))
)]
pub async fn unlink_indicator(
    State(state): State<AppState>,
    ApiPath((id, indicator_id)): ApiPath<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    condition_service::unlink_indicator(state.storage.conn(), id, indicator_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

use axum::{extract::State, http::StatusCode};
use models::group;
use serde::Deserialize;
use service::expand::Expansion;
use service::group_service::{self, GroupChanges, GroupDetail, NewGroup};

use crate::auth::AppState;
use crate::envelope::{Created, Envelope};
use crate::errors::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::{list_options, ExpandQuery};

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GroupListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    /// `id` or `label`
    pub sort: Option<String>,
}

#[utoipa::path(get, path = "/api/v1/groups", tag = "groups", params(GroupListQuery), responses((status = 200, description = "Page of groups"), (status = 400, description = "Validation Error")))]
pub async fn list(State(state): State<AppState>, ApiQuery(q): ApiQuery<GroupListQuery>) -> Result<Envelope<Vec<group::Model>>, ApiError> {
    let opts = list_options(q.page, q.page_size, q.sort.as_deref())?;
    Ok(Envelope::page(group_service::list_groups(state.storage.conn(), &opts).await?))
}

#[utoipa::path(post, path = "/api/v1/groups", tag = "groups", request_body = crate::openapi::GroupInputDoc, responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 409, description = "Duplicate label")))]
pub async fn create(State(state): State<AppState>, ApiJson(input): ApiJson<NewGroup>) -> Result<Created<group::Model>, ApiError> {
    Ok(Created(group_service::create_group(state.storage.conn(), input).await?))
}

#[utoipa::path(get, path = "/api/v1/groups/{id}", tag = "groups", params(("id" = i32, Path, description = "Group id"), ExpandQuery), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiQuery(q): ApiQuery<ExpandQuery>,
) -> Result<Envelope<GroupDetail>, ApiError> {
    let expand = Expansion::parse(q.expand.as_deref(), group_service::EXPANSIONS)?;
    Ok(Envelope::one(group_service::get_group_detail(state.storage.conn(), id, &expand).await?))
}

#[utoipa::path(put, path = "/api/v1/groups/{id}", tag = "groups", params(("id" = i32, Path, description = "Group id")), request_body = crate::openapi::GroupInputDoc, responses((status = 200, description = "Replaced"), (status = 404, description = "Not Found")))]
pub async fn replace(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<NewGroup>,
) -> Result<Envelope<group::Model>, ApiError> {
    Ok(Envelope::one(group_service::replace_group(state.storage.conn(), id, input).await?))
}

#[utoipa::path(patch, path = "/api/v1/groups/{id}", tag = "groups", params(("id" = i32, Path, description = "Group id")), request_body = crate::openapi::GroupPatchDoc, responses((status = 200, description = "Updated"), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(changes): ApiJson<GroupChanges>,
) -> Result<Envelope<group::Model>, ApiError> {
    Ok(Envelope::one(group_service::update_group(state.storage.conn(), id, changes).await?))
}

/// Conditions of the deleted group are kept and lose their group.
#[utoipa::path(delete, path = "/api/v1/groups/{id}", tag = "groups", params(("id" = i32, Path, description = "Group id")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<i32>) -> Result<StatusCode, ApiError> {
    group_service::delete_group(state.storage.conn(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

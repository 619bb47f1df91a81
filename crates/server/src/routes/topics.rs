use axum::{extract::State, http::StatusCode};
use models::topic;
use serde::Deserialize;
use service::expand::Expansion;
use service::topic_service::{self, NewTopic, TopicChanges, TopicDetail};

use crate::auth::AppState;
use crate::envelope::{Created, Envelope};
use crate::errors::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::{list_options, ExpandQuery};

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TopicListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    /// `id` or `title`, `-` prefix for descending
    pub sort: Option<String>,
}

#[utoipa::path(
    get, path = "/api/v1/topics", tag = "topics",
    params(TopicListQuery),
    responses((status = 200, description = "Page of topics"), (status = 400, description = "Validation Error"))
)]
pub async fn list(State(state): State<AppState>, ApiQuery(q): ApiQuery<TopicListQuery>) -> Result<Envelope<Vec<topic::Model>>, ApiError> {
    let opts = list_options(q.page, q.page_size, q.sort.as_deref())?;
    let page = topic_service::list_topics(state.storage.conn(), &opts).await?;
    Ok(Envelope::page(page))
}

#[utoipa::path(
    post, path = "/api/v1/topics", tag = "topics",
    request_body = crate::openapi::TopicInputDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Duplicate title")
    )
)]
pub async fn create(State(state): State<AppState>, ApiJson(input): ApiJson<NewTopic>) -> Result<Created<topic::Model>, ApiError> {
    Ok(Created(topic_service::create_topic(state.storage.conn(), input).await?))
}

#[utoipa::path(
    get, path = "/api/v1/topics/{id}", tag = "topics",
    params(("id" = i32, Path, description = "Topic id"), ExpandQuery),
    responses((status = 200, description = "OK"), (status = 400, description = "Unknown expansion"), (status = 404, description = "Not Found"))
)]
pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiQuery(q): ApiQuery<ExpandQuery>,
) -> Result<Envelope<TopicDetail>, ApiError> {
    let expand = Expansion::parse(q.expand.as_deref(), topic_service::EXPANSIONS)?;
    Ok(Envelope::one(topic_service::get_topic_detail(state.storage.conn(), id, &expand).await?))
}

#[utoipa::path(
    put, path = "/api/v1/topics/{id}", tag = "topics",
    params(("id" = i32, Path, description = "Topic id")),
    request_body = crate::openapi::TopicInputDoc,
    responses((status = 200, description = "Replaced"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"), (status = 409, description = "Duplicate title"))
)]
pub async fn replace(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<NewTopic>,
) -> Result<Envelope<topic::Model>, ApiError> {
    Ok(Envelope::one(topic_service::replace_topic(state.storage.conn(), id, input).await?))
}

#[utoipa::path(
    patch, path = "/api/v1/topics/{id}", tag = "topics",
    params(("id" = i32, Path, description = "Topic id")),
    request_body = crate::openapi::TopicPatchDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"), (status = 409, description = "Duplicate title"))
)]
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(changes): ApiJson<TopicChanges>,
) -> Result<Envelope<topic::Model>, ApiError> {
    Ok(Envelope::one(topic_service::update_topic(state.storage.conn(), id, changes).await?))
}

#[utoipa::path(
    delete, path = "/api/v1/topics/{id}", tag = "topics",
    params(("id" = i32, Path, description = "Topic id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"), (status = 409, description = "Topic still has conditions"))
)]
pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<i32>) -> Result<StatusCode, ApiError> {
    topic_service::delete_topic(state.storage.conn(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

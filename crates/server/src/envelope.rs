//! Success envelope: `{"data": ..., "meta": {...}}`; `meta` only on lists.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::pagination::{Page, PageMeta};

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

impl<T: Serialize> Envelope<T> {
    pub fn one(data: T) -> Self { Self { data, meta: None } }
}

impl<T: Serialize> Envelope<Vec<T>> {
    pub fn page(page: Page<T>) -> Self { Self { data: page.items, meta: Some(page.meta) } }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response { Json(self).into_response() }
}

/// `201 Created` with the created record.
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response { (StatusCode::CREATED, Json(Envelope::one(self.0))).into_response() }
}

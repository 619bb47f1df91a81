use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use models::errors::FieldErrors;
use serde::Serialize;
use service::auth::AuthError;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

use crate::metrics::ERRORS_TOTAL;

/// Error kinds exposed in the error envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ValidationError,
    NotFound,
    DuplicateKey,
    ForeignKeyViolation,
    Conflict,
    Unauthorized,
    Forbidden,
    MethodNotAllowed,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorKind::DuplicateKey | ErrorKind::ForeignKeyViolation | ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::DuplicateKey => "DuplicateKey",
            ErrorKind::ForeignKeyViolation => "ForeignKeyViolation",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::MethodNotAllowed => "MethodNotAllowed",
            ErrorKind::Internal => "Internal",
        }
    }
}

/// Single error type returned by every handler.
#[derive(Debug, Error)]
#[error("{}: {message}", .kind.as_str())]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    pub fields: FieldErrors,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    kind: ErrorKind,
    message: &'a str,
    fields: &'a BTreeMap<String, String>,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), fields: FieldErrors::new() }
    }

    pub fn with_fields(mut self, fields: FieldErrors) -> Self {
        self.fields = fields;
        self
    }

    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, "invalid input").with_fields(FieldErrors::single(field, reason))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self { Self::new(ErrorKind::Unauthorized, message) }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(fields) => Self::new(ErrorKind::ValidationError, "invalid input").with_fields(fields),
            ServiceError::NotFound(msg) => Self::new(ErrorKind::NotFound, msg),
            ServiceError::DuplicateKey { message, fields } => Self::new(ErrorKind::DuplicateKey, message).with_fields(fields),
            ServiceError::ForeignKeyViolation { message, fields } => {
                Self::new(ErrorKind::ForeignKeyViolation, message).with_fields(fields)
            }
            ServiceError::Conflict(msg) => Self::new(ErrorKind::Conflict, msg),
            ServiceError::Db(msg) => {
                error!(error = %msg, "storage failure");
                Self::new(ErrorKind::Internal, "internal error")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let code = err.code();
        match err {
            AuthError::Forbidden(msg) => {
                warn!(code, reason = %msg, "credential lacks permission");
                Self::new(ErrorKind::Forbidden, msg)
            }
            AuthError::Unauthorized(msg) | AuthError::TokenError(msg) => {
                warn!(code, reason = %msg, "credential rejected");
                Self::unauthorized("invalid or missing credentials")
            }
            AuthError::Repository(msg) => {
                error!(code, error = %msg, "identity repository failure");
                Self::new(ErrorKind::Internal, "internal error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.kind.status();
        ERRORS_TOTAL.with_label_values(&[self.kind.as_str()]).inc();
        if status.is_client_error() {
            warn!(kind = self.kind.as_str(), message = %self.message, "request rejected");
        }
        let fields = self.fields.into_map();
        let body = ErrorEnvelope { error: ErrorBody { kind: self.kind, message: &self.message, fields: &fields } };
        (status, Json(body)).into_response()
    }
}

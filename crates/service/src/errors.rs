use models::errors::{FieldErrors, ModelError};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(FieldErrors),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("duplicate key: {message}")]
    DuplicateKey { message: String, fields: FieldErrors },
    #[error("foreign key violation: {message}")]
    ForeignKeyViolation { message: String, fields: FieldErrors },
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: i32) -> Self { Self::NotFound(format!("{entity} {id} not found")) }

    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, reason))
    }

    pub fn duplicate(entity: &str, field: &str, value: &str) -> Self {
        Self::DuplicateKey {
            message: format!("{entity} with {field} '{value}' already exists"),
            fields: FieldErrors::single(field, "already exists"),
        }
    }

    pub fn missing_reference(field: &str, entity: &str, id: i32) -> Self {
        let reason = format!("{entity} {id} does not exist");
        Self::ForeignKeyViolation { message: reason.clone(), fields: FieldErrors::single(field, reason) }
    }

    /// Classify a storage error; constraint violations the database caught
    /// before our own checks map onto the same kinds.
    pub fn db(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => Self::DuplicateKey { message: msg, fields: FieldErrors::new() },
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => Self::ForeignKeyViolation { message: msg, fields: FieldErrors::new() },
            _ => Self::Db(err.to_string()),
        }
    }
}

impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self { Self::db(err) }
}

impl From<ModelError> for ServiceError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Validation(fields) => Self::Validation(fields),
            ModelError::Db(msg) => Self::Db(msg),
        }
    }
}

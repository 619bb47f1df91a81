use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Field-level validation failures keyed by field name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self { Self::default() }

    pub fn single(field: &str, reason: impl Into<String>) -> Self {
        let mut errs = Self::new();
        errs.add(field, reason);
        errs
    }

    /// Keeps the first reason recorded for a field.
    pub fn add(&mut self, field: &str, reason: impl Into<String>) -> &mut Self {
        self.0.entry(field.to_string()).or_insert_with(|| reason.into());
        self
    }

    pub fn check(&mut self, field: &str, outcome: Result<(), String>) -> &mut Self {
        if let Err(reason) = outcome {
            self.add(field, reason);
        }
        self
    }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn get(&self, field: &str) -> Option<&str> { self.0.get(field).map(String::as_str) }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_map(self) -> BTreeMap<String, String> { self.0 }

    pub fn finish(self) -> Result<(), ModelError> {
        if self.is_empty() { Ok(()) } else { Err(ModelError::Validation(self)) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, reason) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {reason}")?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(FieldErrors),
    #[error("database error: {0}")]
    Db(String),
}

impl ModelError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, reason))
    }
}

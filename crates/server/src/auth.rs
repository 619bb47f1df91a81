use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header::AUTHORIZATION, Method};
use axum::middleware::Next;
use axum::response::Response;
use service::auth::CredentialVerifier;
use service::storage::Storage;
use tracing::debug;

use crate::errors::ApiError;

/// Shared router state.
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub verifier: Arc<dyn CredentialVerifier>,
}

impl AppState {
    pub fn new(storage: Storage, verifier: Arc<dyn CredentialVerifier>) -> Self { Self { storage, verifier } }
}

fn bearer_token(req: &Request) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").or_else(|| value.strip_prefix("bearer "))?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Reads pass through; mutations need a bearer token the verifier accepts.
/// The resulting `Principal` is stored in request extensions.
pub async fn require_credential(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, ApiError> {
    if matches!(*req.method(), Method::GET | Method::HEAD | Method::OPTIONS) {
        return Ok(next.run(req).await);
    }
    let token = bearer_token(&req).ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;
    let principal = state.verifier.verify(&token).await?;
    debug!(subject = %principal.subject, method = %req.method(), "credential accepted");
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use super::domain::{Claims, Principal};
use super::errors::AuthError;

/// Verifies the credential presented with a request.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError>;
}

/// HS256 bearer tokens signed with a shared secret.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        Self { key: DecodingKey::from_secret(secret.as_bytes()), validation }
    }
}

#[async_trait]
impl CredentialVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            debug!(err = %e, "token rejected");
            AuthError::Unauthorized(e.to_string())
        })?;
        Ok(Principal { subject: data.claims.sub })
    }
}

/// Sign a token for `subject` valid for `ttl`. Used by operators and tests;
/// the API itself never issues tokens.
pub fn issue_token(secret: &str, subject: &str, ttl: Duration) -> Result<String, AuthError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AuthError::TokenError(e.to_string()))?;
    let claims = Claims { sub: subject.to_string(), exp: (now + ttl).as_secs() as usize, iat: Some(now.as_secs() as usize) };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).map_err(|e| AuthError::TokenError(e.to_string()))
}

/// Fixed-token verifier for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    pub struct StaticTokenVerifier {
        tokens: HashMap<String, Result<String, String>>, // token -> subject, or forbidden reason
    }

    impl StaticTokenVerifier {
        pub fn allow(mut self, token: &str, subject: &str) -> Self {
            self.tokens.insert(token.to_string(), Ok(subject.to_string()));
            self
        }

        pub fn forbid(mut self, token: &str, reason: &str) -> Self {
            self.tokens.insert(token.to_string(), Err(reason.to_string()));
            self
        }
    }

    #[async_trait]
    impl CredentialVerifier for StaticTokenVerifier {
        async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
            match self.tokens.get(token) {
                Some(Ok(subject)) => Ok(Principal { subject: subject.clone() }),
                Some(Err(reason)) => Err(AuthError::Forbidden(reason.clone())),
                None => Err(AuthError::Unauthorized("unknown token".into())),
            }
        }
    }
}

//! Auth capabilities the API layer depends on.
//!
//! The catalog core never issues sessions or hashes secrets itself: bearer
//! tokens are checked by a [`verifier::CredentialVerifier`] and stored account
//! hashes are compared by a [`secret::SecretMatcher`]. Both are injected.

pub mod domain;
pub mod errors;
pub mod verifier;
pub mod secret;

pub use domain::Principal;
pub use errors::AuthError;
pub use verifier::{CredentialVerifier, JwtVerifier};

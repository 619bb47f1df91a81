//! HTTP surface of the catalog: axum router, handlers, envelopes and the
//! error mapping shared by every endpoint.

pub mod auth;
pub mod envelope;
pub mod errors;
pub mod extract;
pub mod metrics;
pub mod openapi;
pub mod routes;
pub mod startup;

pub use startup::run;

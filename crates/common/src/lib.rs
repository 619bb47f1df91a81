//! Shared building blocks for the catalog crates: wire types used by more than
//! one crate and tracing initialization.

pub mod types;
pub mod utils;

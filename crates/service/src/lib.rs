//! Service layer providing catalog CRUD and relationship traversal on top of models.
//! - Every write runs in one transaction that commits only on success.
//! - Reuses validation and entity definitions in `models` crate.
//! - Translates storage failures into [`errors::ServiceError`] kinds.

pub mod errors;
pub mod auth;
pub mod storage;
pub mod pagination;
pub mod expand;
pub mod input;
pub mod account_service;
pub mod topic_service;
pub mod group_service;
pub mod condition_service;
pub mod phase_service;
pub mod indicator_service;
#[cfg(test)]
pub mod test_support;

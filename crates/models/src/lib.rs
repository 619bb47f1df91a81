//! SeaORM entities of the catalog schema with their relations and field checks.

pub mod errors;
pub mod validation;
pub mod db;
pub mod account;
pub mod topic;
pub mod group;
pub mod condition;
pub mod phase;
pub mod indicator;
pub mod condition_indicator;

#[cfg(test)]
mod tests;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::validation;

pub const HANDLE_MAX: usize = 80;
pub const EMAIL_MAX: usize = 180;
pub const PASS_HASH_MAX: usize = 200;
pub const NAME_MAX: usize = 80;
pub const AVATAR_URL_MAX: usize = 300;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app_accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub handle: String,
    #[sea_orm(unique)]
    pub email_address: String,
    #[serde(skip_serializing)]
    pub pass_hash: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_handle(handle: &str) -> Result<(), String> {
    validation::required_text(handle, HANDLE_MAX)?;
    if handle.chars().any(char::is_whitespace) {
        return Err("must not contain whitespace".into());
    }
    if handle.contains('@') {
        return Err("must not contain '@'".into());
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    validation::required_text(email, EMAIL_MAX)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace) => Ok(()),
        _ => Err("invalid email".into()),
    }
}

pub fn validate_pass_hash(hash: &str) -> Result<(), String> {
    validation::required_text(hash, PASS_HASH_MAX)
}

pub fn validate_name(name: Option<&str>) -> Result<(), String> {
    validation::optional_text(name, NAME_MAX)
}

pub fn validate_avatar_url(url: Option<&str>) -> Result<(), String> {
    let Some(u) = url else { return Ok(()) };
    validation::max_chars(u, AVATAR_URL_MAX)?;
    if !(u.starts_with("http://") || u.starts_with("https://")) {
        return Err("must start with http(s)".into());
    }
    Ok(())
}

/// Emails are compared case-insensitively, so they are stored lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

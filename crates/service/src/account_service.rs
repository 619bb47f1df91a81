//! Accounts hold an opaque, already hashed secret. Lookup accepts either the
//! handle or the email address; emails compare case-insensitively.

use models::{account, errors::FieldErrors};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::auth::secret::SecretMatcher;
use crate::auth::AuthError;
use crate::errors::ServiceError;
use crate::input::double_option;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub handle: String,
    pub email_address: String,
    pub pass_hash: String,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Profile fields an account may change; identity fields stay fixed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileChanges {
    #[serde(default, deserialize_with = "double_option")]
    pub given_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub family_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub avatar_url: Option<Option<String>>,
}

impl NewAccount {
    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut errs = FieldErrors::new();
        errs.check("handle", account::validate_handle(&self.handle))
            .check("email_address", account::validate_email(&self.email_address))
            .check("pass_hash", account::validate_pass_hash(&self.pass_hash))
            .check("given_name", account::validate_name(self.given_name.as_deref()))
            .check("family_name", account::validate_name(self.family_name.as_deref()))
            .check("avatar_url", account::validate_avatar_url(self.avatar_url.as_deref()));
        Ok(errs.finish()?)
    }
}

impl ProfileChanges {
    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut errs = FieldErrors::new();
        if let Some(v) = &self.given_name {
            errs.check("given_name", account::validate_name(v.as_deref()));
        }
        if let Some(v) = &self.family_name {
            errs.check("family_name", account::validate_name(v.as_deref()));
        }
        if let Some(v) = &self.avatar_url {
            errs.check("avatar_url", account::validate_avatar_url(v.as_deref()));
        }
        Ok(errs.finish()?)
    }
}

/// An identifier containing '@' names an email address first; the handle
/// match is only a fallback.
async fn find_by_identifier<C: ConnectionTrait>(conn: &C, identifier: &str) -> Result<Option<account::Model>, ServiceError> {
    if identifier.contains('@') {
        let by_email = account::Entity::find()
            .filter(account::Column::EmailAddress.eq(account::normalize_email(identifier)))
            .one(conn)
            .await?;
        if by_email.is_some() {
            return Ok(by_email);
        }
    }
    Ok(account::Entity::find().filter(account::Column::Handle.eq(identifier)).one(conn).await?)
}

/// Create an account; handle and email must both be unused.
#[instrument(skip(db, input), fields(handle = %input.handle))]
pub async fn create_account(db: &DatabaseConnection, input: NewAccount) -> Result<account::Model, ServiceError> {
    input.validate()?;
    let email = account::normalize_email(&input.email_address);
    let txn = db.begin().await?;
    if account::Entity::find().filter(account::Column::Handle.eq(input.handle.as_str())).one(&txn).await?.is_some() {
        return Err(ServiceError::duplicate("account", "handle", &input.handle));
    }
    if account::Entity::find().filter(account::Column::EmailAddress.eq(email.as_str())).one(&txn).await?.is_some() {
        return Err(ServiceError::duplicate("account", "email_address", &email));
    }
    let created = account::ActiveModel {
        handle: Set(input.handle),
        email_address: Set(email),
        pass_hash: Set(input.pass_hash),
        given_name: Set(input.given_name),
        family_name: Set(input.family_name),
        avatar_url: Set(input.avatar_url),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    info!(id = created.id, "account_created");
    Ok(created)
}

pub async fn get_account(db: &DatabaseConnection, id: i32) -> Result<Option<account::Model>, ServiceError> {
    Ok(account::Entity::find_by_id(id).one(db).await?)
}

/// Look an account up by handle or by email address.
pub async fn find_account_by_identifier(db: &DatabaseConnection, identifier: &str) -> Result<Option<account::Model>, ServiceError> {
    find_by_identifier(db, identifier).await
}

#[instrument(skip(db, changes))]
pub async fn update_account_profile(db: &DatabaseConnection, id: i32, changes: ProfileChanges) -> Result<account::Model, ServiceError> {
    changes.validate()?;
    let txn = db.begin().await?;
    let existing = account::Entity::find_by_id(id).one(&txn).await?.ok_or_else(|| ServiceError::not_found("account", id))?;
    let mut am: account::ActiveModel = existing.clone().into();
    if let Some(v) = changes.given_name {
        am.given_name = Set(v);
    }
    if let Some(v) = changes.family_name {
        am.family_name = Set(v);
    }
    if let Some(v) = changes.avatar_url {
        am.avatar_url = Set(v);
    }
    let updated = if am.is_changed() { am.update(&txn).await? } else { existing };
    txn.commit().await?;
    info!(id, "account_updated");
    Ok(updated)
}

#[instrument(skip(db))]
pub async fn delete_account(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let res = account::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("account", id));
    }
    info!(id, "account_deleted");
    Ok(())
}

/// Check a presented password against the stored hash. Unknown identifiers
/// and wrong passwords fail the same way.
#[instrument(skip(db, password, matcher))]
pub async fn authenticate(
    db: &DatabaseConnection,
    identifier: &str,
    password: &str,
    matcher: &dyn SecretMatcher,
) -> Result<account::Model, AuthError> {
    let found = find_by_identifier(db, identifier).await.map_err(|e| AuthError::Repository(e.to_string()))?;
    match found {
        Some(acc) if matcher.matches(password, &acc.pass_hash) => {
            info!(id = acc.id, "account_authenticated");
            Ok(acc)
        }
        _ => {
            warn!("authentication_failed");
            Err(AuthError::Unauthorized("invalid credentials".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::secret::mock::PlainSecretMatcher;
    use crate::test_support::get_db;

    fn olga() -> NewAccount {
        NewAccount {
            handle: "olga_b".into(),
            email_address: "Olga@Example.com".into(),
            pass_hash: "plain:hunter2".into(),
            given_name: Some("Olga".into()),
            family_name: None,
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn create_and_lookup_by_either_identifier() -> anyhow::Result<()> {
        let db = get_db().await?;
        let acc = create_account(&db, olga()).await?;
        assert_eq!(acc.email_address, "olga@example.com");
        assert_eq!(find_account_by_identifier(&db, "olga_b").await?.map(|a| a.id), Some(acc.id));
        assert_eq!(find_account_by_identifier(&db, "OLGA@example.COM").await?.map(|a| a.id), Some(acc.id));
        assert!(find_account_by_identifier(&db, "nobody").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_handle_or_email_is_rejected() -> anyhow::Result<()> {
        let db = get_db().await?;
        create_account(&db, olga()).await?;

        let mut same_email = olga();
        same_email.handle = "other".into();
        match create_account(&db, same_email).await {
            Err(ServiceError::DuplicateKey { fields, .. }) => assert!(fields.get("email_address").is_some()),
            other => panic!("unexpected {other:?}"),
        }

        let mut same_handle = olga();
        same_handle.email_address = "other@example.com".into();
        assert!(matches!(create_account(&db, same_handle).await, Err(ServiceError::DuplicateKey { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_fields_are_collected() -> anyhow::Result<()> {
        let db = get_db().await?;
        let mut bad = olga();
        bad.handle = "has space".into();
        bad.email_address = "nope".into();
        match create_account(&db, bad).await {
            Err(ServiceError::Validation(fields)) => {
                assert!(fields.get("handle").is_some());
                assert!(fields.get("email_address").is_some());
            }
            other => panic!("unexpected {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn authenticate_uses_matcher() -> anyhow::Result<()> {
        let db = get_db().await?;
        let acc = create_account(&db, olga()).await?;
        let ok = authenticate(&db, "olga@example.com", "hunter2", &PlainSecretMatcher).await?;
        assert_eq!(ok.id, acc.id);
        assert!(matches!(authenticate(&db, "olga_b", "wrong", &PlainSecretMatcher).await, Err(AuthError::Unauthorized(_))));
        assert!(matches!(authenticate(&db, "ghost", "hunter2", &PlainSecretMatcher).await, Err(AuthError::Unauthorized(_))));
        Ok(())
    }

    #[tokio::test]
    async fn email_identifier_wins_over_a_lookalike_handle() -> anyhow::Result<()> {
        let db = get_db().await?;
        let mut at_handle = olga();
        at_handle.handle = "b@x.io".into();
        match create_account(&db, at_handle).await {
            Err(ServiceError::Validation(fields)) => assert!(fields.get("handle").is_some()),
            other => panic!("unexpected {other:?}"),
        }

        // rows written before the handle rule existed
        let legacy = account::ActiveModel {
            handle: Set("b@x.io".into()),
            email_address: Set("a@x.io".into()),
            pass_hash: Set("plain:first".into()),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        let mut owner = olga();
        owner.handle = "bea".into();
        owner.email_address = "b@x.io".into();
        owner.pass_hash = "plain:second".into();
        let owner = create_account(&db, owner).await?;

        let found = authenticate(&db, "b@x.io", "second", &PlainSecretMatcher).await?;
        assert_eq!(found.id, owner.id);
        assert_ne!(found.id, legacy.id);
        assert_eq!(find_account_by_identifier(&db, "B@X.IO").await?.map(|a| a.id), Some(owner.id));
        Ok(())
    }

    #[tokio::test]
    async fn profile_update_and_delete() -> anyhow::Result<()> {
        let db = get_db().await?;
        let acc = create_account(&db, olga()).await?;
        let changes = ProfileChanges {
            given_name: Some(None),
            avatar_url: Some(Some("https://cdn.example.com/o.png".into())),
            ..Default::default()
        };
        let updated = update_account_profile(&db, acc.id, changes).await?;
        assert_eq!(updated.given_name, None);
        assert_eq!(updated.avatar_url.as_deref(), Some("https://cdn.example.com/o.png"));

        delete_account(&db, acc.id).await?;
        assert!(get_account(&db, acc.id).await?.is_none());
        Ok(())
    }
}

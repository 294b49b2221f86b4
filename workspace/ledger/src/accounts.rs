//! Account registration and credential checks.

use std::future::Future;

use chrono::{DateTime, Utc};
use common::{RegisterRequest, UserDto};
use model::entities::{profile, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
    TransactionTrait,
};
use tracing::{debug, error, info, instrument, warn};

use crate::error::{LedgerError, Result};
use crate::profiles;

/// One-way password hashing used at registration and login.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> impl Future<Output = Result<String>> + Send;

    /// `false` for a wrong password or a malformed stored hash.
    fn verify(&self, hash: &str, password: &str) -> impl Future<Output = bool> + Send;

    /// A well-formed hash with the active cost parameters. Login checks
    /// the password against it when the email is unknown.
    fn decoy_hash(&self) -> &str;
}

/// A user together with every profile it owns, owner profile first.
#[derive(Debug, Clone)]
pub struct Account {
    pub user: user::Model,
    pub profiles: Vec<profile::Model>,
}

impl Account {
    pub fn user_dto(&self) -> UserDto {
        UserDto {
            id: self.user.id,
            email: self.user.email.clone(),
        }
    }
}

/// Creates the user and its owner profile in one unit.
#[instrument(skip(db, hasher, request), fields(email = %request.email))]
pub async fn register<H: PasswordHasher>(
    db: &DatabaseConnection,
    hasher: &H,
    request: &RegisterRequest,
    now: DateTime<Utc>,
) -> Result<Account> {
    let email = request.email.trim().to_string();
    let name = request.name.trim().to_string();

    if email.is_empty() || request.password.is_empty() || name.is_empty() {
        return Err(LedgerError::InvalidInput(
            "email, password, and name are required".to_string(),
        ));
    }
    if request.password.chars().count() < 8 {
        return Err(LedgerError::InvalidInput(
            "password must be at least 8 characters".to_string(),
        ));
    }

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        warn!("Registration rejected: email already registered");
        return Err(LedgerError::Conflict("email already registered".to_string()));
    }

    let password_hash = hasher.hash(&request.password).await?;

    let txn = db.begin().await?;

    let user = user::ActiveModel {
        email: Set(email),
        password_hash: Set(password_hash),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|db_error| match db_error.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            warn!("Registration lost a race on a duplicate email");
            LedgerError::Conflict("email already registered".to_string())
        }
        _ => {
            error!("Failed to insert user: {}", db_error);
            LedgerError::Database(db_error)
        }
    })?;

    let owner = profile::ActiveModel {
        user_id: Set(user.id),
        name: Set(name),
        avatar_color: Set(profile::DEFAULT_AVATAR_COLOR.to_string()),
        is_owner: Set(true),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!("Registered user {} with owner profile {}", user.id, owner.id);
    Ok(Account {
        user,
        profiles: vec![owner],
    })
}

/// Unknown email and wrong password are indistinguishable to the caller.
#[instrument(skip(db, hasher, password))]
pub async fn login<H: PasswordHasher>(
    db: &DatabaseConnection,
    hasher: &H,
    email: &str,
    password: &str,
) -> Result<Account> {
    let user = user::Entity::find()
        .filter(user::Column::Email.eq(email.trim()))
        .one(db)
        .await?;

    let Some(user) = user else {
        // Same hashing cost as a wrong password
        hasher.verify(hasher.decoy_hash(), password).await;
        debug!("Login failed: unknown email");
        return Err(LedgerError::Unauthorized("invalid credentials".to_string()));
    };

    if !hasher.verify(&user.password_hash, password).await {
        debug!("Login failed: password mismatch for user {}", user.id);
        return Err(LedgerError::Unauthorized("invalid credentials".to_string()));
    }

    let profiles = profiles::owned_profiles(db, user.id).await?;
    info!("User {} logged in", user.id);
    Ok(Account { user, profiles })
}

/// Loads a user and its profiles, used after a token rotation.
pub async fn load_account(db: &DatabaseConnection, user_id: i32) -> Result<Account> {
    let user = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::Unauthorized("unknown user".to_string()))?;
    let profiles = profiles::owned_profiles(db, user.id).await?;
    Ok(Account { user, profiles })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{setup_db, PlainHasher};
    use sea_orm::PaginatorTrait;

    fn request(email: &str, password: &str, name: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_creates_user_and_owner_profile() {
        let db = setup_db().await.unwrap();

        let account = register(
            &db,
            &PlainHasher::default(),
            &request("sam@example.com", "password123", "Sam"),
            Utc::now(),
        )
        .await
        .unwrap();

        assert_eq!(account.user.email, "sam@example.com");
        assert_eq!(account.user.password_hash, "plain:password123");
        assert_eq!(account.profiles.len(), 1);
        assert!(account.profiles[0].is_owner);
        assert_eq!(account.profiles[0].name, "Sam");
        assert_eq!(account.profiles[0].avatar_color, "#10b981");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts_without_side_effects() {
        let db = setup_db().await.unwrap();
        let hasher = PlainHasher::default();

        register(&db, &hasher, &request("dup@example.com", "password123", "One"), Utc::now())
            .await
            .unwrap();
        let second = register(
            &db,
            &hasher,
            &request("dup@example.com", "password456", "Two"),
            Utc::now(),
        )
        .await;

        assert!(matches!(second, Err(LedgerError::Conflict(_))));
        assert_eq!(user::Entity::find().count(&db).await.unwrap(), 1);
        assert_eq!(profile::Entity::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_short_password_is_invalid() {
        let db = setup_db().await.unwrap();

        let result = register(
            &db,
            &PlainHasher::default(),
            &request("short@example.com", "1234567", "Short"),
            Utc::now(),
        )
        .await;

        assert!(matches!(result, Err(LedgerError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_login_rejects_unknown_email_and_wrong_password_alike() {
        let db = setup_db().await.unwrap();
        let hasher = PlainHasher::default();
        register(&db, &hasher, &request("kim@example.com", "password123", "Kim"), Utc::now())
            .await
            .unwrap();

        let account = login(&db, &hasher, "kim@example.com", "password123").await.unwrap();
        assert_eq!(account.profiles.len(), 1);

        let wrong = login(&db, &hasher, "kim@example.com", "password124").await;
        let unknown = login(&db, &hasher, "nobody@example.com", "password123").await;

        match (wrong, unknown) {
            (Err(LedgerError::Unauthorized(a)), Err(LedgerError::Unauthorized(b))) => {
                assert_eq!(a, b);
            }
            other => panic!("expected two Unauthorized errors, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_email_still_verifies_a_password() {
        let db = setup_db().await.unwrap();
        let hasher = PlainHasher::default();

        let result = login(&db, &hasher, "ghost@example.com", "password123").await;

        assert!(matches!(result, Err(LedgerError::Unauthorized(_))));
        assert_eq!(hasher.verifications(), 1);
    }
}

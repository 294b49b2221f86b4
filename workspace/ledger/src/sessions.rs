//! Opaque refresh tokens.
//!
//! Only the SHA-256 digest of a token is stored. A token is redeemed by
//! deleting its row and inserting a replacement in one unit; the delete must
//! hit exactly one live row, so a token can be redeemed at most once even
//! under concurrent requests.

use chrono::{DateTime, Duration, Utc};
use model::entities::refresh_token;
use rand::rngs::OsRng;
use rand::RngCore;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use crate::error::{LedgerError, Result};

const TOKEN_BYTES: usize = 32;

/// Fresh random token, hex encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Stores a new refresh token for `user_id` and returns its plain value.
///
/// The user's expired tokens are dropped first.
#[instrument(skip(db))]
pub async fn issue<C>(db: &C, user_id: i32, ttl: Duration, now: DateTime<Utc>) -> Result<String>
where
    C: ConnectionTrait,
{
    let purged = refresh_token::Entity::delete_many()
        .filter(refresh_token::Column::UserId.eq(user_id))
        .filter(refresh_token::Column::ExpiresAt.lte(now))
        .exec(db)
        .await?;
    if purged.rows_affected > 0 {
        debug!("Dropped {} expired refresh tokens of user {}", purged.rows_affected, user_id);
    }

    let token = generate_token();

    refresh_token::ActiveModel {
        user_id: Set(user_id),
        token_hash: Set(hash_token(&token)),
        expires_at: Set(now + ttl),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    debug!("Issued refresh token for user {}", user_id);
    Ok(token)
}

/// Outcome of a successful rotation.
#[derive(Debug, Clone)]
pub struct Rotation {
    pub user_id: i32,
    pub refresh_token: String,
}

/// Redeems `token` and issues its replacement.
#[instrument(skip(db, token))]
pub async fn rotate(
    db: &DatabaseConnection,
    token: &str,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<Rotation> {
    let token_hash = hash_token(token);
    let txn = db.begin().await?;

    let stored = refresh_token::Entity::find()
        .filter(refresh_token::Column::TokenHash.eq(token_hash.as_str()))
        .filter(refresh_token::Column::ExpiresAt.gt(now))
        .one(&txn)
        .await?;

    let Some(stored) = stored else {
        warn!("Refresh rejected: unknown or expired token");
        return Err(LedgerError::Unauthorized("invalid refresh token".to_string()));
    };

    let deleted = refresh_token::Entity::delete_many()
        .filter(refresh_token::Column::Id.eq(stored.id))
        .filter(refresh_token::Column::TokenHash.eq(token_hash.as_str()))
        .exec(&txn)
        .await?;

    if deleted.rows_affected != 1 {
        warn!("Refresh rejected: token {} already redeemed", stored.id);
        return Err(LedgerError::Unauthorized("invalid refresh token".to_string()));
    }

    let replacement = issue(&txn, stored.user_id, ttl, now).await?;
    txn.commit().await?;

    info!("Rotated refresh token for user {}", stored.user_id);
    Ok(Rotation {
        user_id: stored.user_id,
        refresh_token: replacement,
    })
}

/// Drops every expired token; returns how many were removed.
#[instrument(skip(db))]
pub async fn purge_expired(db: &DatabaseConnection, now: DateTime<Utc>) -> Result<u64> {
    let result = refresh_token::Entity::delete_many()
        .filter(refresh_token::Column::ExpiresAt.lte(now))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        info!("Purged {} expired refresh tokens", result.rows_affected);
    }
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{create_user, setup_db};
    use sea_orm::PaginatorTrait;

    #[test]
    fn test_tokens_are_random_hex() {
        let first = generate_token();
        let second = generate_token();

        assert_eq!(first.len(), TOKEN_BYTES * 2);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }

    #[test]
    fn test_hash_is_sha256_hex() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_only_the_hash_is_stored() {
        let db = setup_db().await.unwrap();
        let (user, _) = create_user(&db, "hash@example.com").await.unwrap();

        let token = issue(&db, user.id, Duration::days(7), Utc::now()).await.unwrap();

        let stored = refresh_token::Entity::find().one(&db).await.unwrap().unwrap();
        assert_eq!(stored.token_hash, hash_token(&token));
        assert_ne!(stored.token_hash, token);
    }

    #[tokio::test]
    async fn test_second_redemption_is_unauthorized() {
        let db = setup_db().await.unwrap();
        let (user, _) = create_user(&db, "rotate@example.com").await.unwrap();
        let now = Utc::now();
        let token = issue(&db, user.id, Duration::days(7), now).await.unwrap();

        let rotation = rotate(&db, &token, Duration::days(7), now).await.unwrap();
        assert_eq!(rotation.user_id, user.id);
        assert_ne!(rotation.refresh_token, token);

        let replay = rotate(&db, &token, Duration::days(7), now).await;
        assert!(matches!(replay, Err(LedgerError::Unauthorized(_))));

        // the replacement is still valid
        assert!(rotate(&db, &rotation.refresh_token, Duration::days(7), now).await.is_ok());
        assert_eq!(refresh_token::Entity::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected_and_purged() {
        let db = setup_db().await.unwrap();
        let (user, _) = create_user(&db, "expired@example.com").await.unwrap();
        let issued_at = Utc::now() - Duration::days(8);
        let token = issue(&db, user.id, Duration::days(7), issued_at).await.unwrap();

        let result = rotate(&db, &token, Duration::days(7), Utc::now()).await;
        assert!(matches!(result, Err(LedgerError::Unauthorized(_))));

        assert_eq!(purge_expired(&db, Utc::now()).await.unwrap(), 1);
        assert_eq!(refresh_token::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_issue_drops_the_users_expired_tokens() {
        let db = setup_db().await.unwrap();
        let (user, _) = create_user(&db, "stale@example.com").await.unwrap();
        let (other, _) = create_user(&db, "other@example.com").await.unwrap();
        let long_ago = Utc::now() - Duration::days(30);
        issue(&db, user.id, Duration::days(7), long_ago).await.unwrap();
        issue(&db, user.id, Duration::days(7), long_ago).await.unwrap();
        issue(&db, other.id, Duration::days(7), long_ago).await.unwrap();

        let fresh = issue(&db, user.id, Duration::days(7), Utc::now()).await.unwrap();

        let remaining = refresh_token::Entity::find().all(&db).await.unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().any(|t| t.token_hash == hash_token(&fresh)));
        assert!(remaining.iter().any(|t| t.user_id == other.id));
    }
}

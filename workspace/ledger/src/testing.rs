//! Shared fixtures for ledger tests.

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use model::entities::{node, profile, user};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, DbErr, Set};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::accounts::PasswordHasher;

pub(crate) async fn setup_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Inserts a user with its owner profile.
pub(crate) async fn create_user(
    db: &DatabaseConnection,
    email: &str,
) -> Result<(user::Model, profile::Model), DbErr> {
    let now = Utc::now();
    let user = user::ActiveModel {
        email: Set(email.to_string()),
        password_hash: Set("plain:password".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let profile = profile::ActiveModel {
        user_id: Set(user.id),
        name: Set("Owner".to_string()),
        avatar_color: Set(profile::DEFAULT_AVATAR_COLOR.to_string()),
        is_owner: Set(true),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok((user, profile))
}

pub(crate) async fn insert_node(
    db: &DatabaseConnection,
    profile_id: i32,
    label: &str,
) -> Result<node::Model, DbErr> {
    node::ActiveModel {
        profile_id: Set(profile_id),
        kind: Set(node::NodeKind::Account),
        label: Set(label.to_string()),
        institution: Set(None),
        amount: Set(Decimal::ZERO),
        balance: Set(Decimal::ZERO),
        apy: Set(Decimal::ZERO),
        budgeted: Set(Decimal::ZERO),
        goal: Set(Decimal::ZERO),
        metadata: Set("{}".to_string()),
        sort_order: Set(0),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Reversible stand-in for the real credential service.
#[derive(Default)]
pub(crate) struct PlainHasher {
    verifications: AtomicUsize,
}

impl PlainHasher {
    pub(crate) fn verifications(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }
}

impl PasswordHasher for PlainHasher {
    async fn hash(&self, password: &str) -> crate::Result<String> {
        Ok(format!("plain:{}", password))
    }

    async fn verify(&self, hash: &str, password: &str) -> bool {
        self.verifications.fetch_add(1, Ordering::SeqCst);
        hash.strip_prefix("plain:") == Some(password)
    }

    fn decoy_hash(&self) -> &str {
        "plain:\u{0}decoy"
    }
}

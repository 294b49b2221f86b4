//! Authorization gate.
//!
//! Every profile-scoped operation first resolves the addressed profile
//! against the caller. Absence and foreign ownership both surface as
//! `Forbidden`, so callers cannot discover other users' profile ids.
//! Nested resources are then checked against the authorized profile and
//! surface as `NotFound` when they are not part of it.

use model::entities::{budget, flow, goal, node, profile};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use tracing::{debug, instrument, warn};

use crate::error::{LedgerError, Result};

#[instrument(skip(db))]
pub async fn authorize_profile<C>(db: &C, user_id: i32, profile_id: i32) -> Result<profile::Model>
where
    C: ConnectionTrait,
{
    let profile = profile::Entity::find_by_id(profile_id).one(db).await?;

    match profile {
        Some(profile) if profile.user_id == user_id => {
            debug!("User {} authorized for profile {}", user_id, profile_id);
            Ok(profile)
        }
        Some(_) => {
            warn!("User {} attempted to access profile {} owned by another user", user_id, profile_id);
            Err(LedgerError::Forbidden("access denied".to_string()))
        }
        None => {
            warn!("User {} attempted to access missing profile {}", user_id, profile_id);
            Err(LedgerError::Forbidden("access denied".to_string()))
        }
    }
}

pub async fn owned_node<C>(db: &C, profile_id: i32, node_id: i32) -> Result<node::Model>
where
    C: ConnectionTrait,
{
    node::Entity::find_by_id(node_id)
        .filter(node::Column::ProfileId.eq(profile_id))
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::NotFound("node not found".to_string()))
}

pub async fn owned_flow<C>(db: &C, profile_id: i32, flow_id: i32) -> Result<flow::Model>
where
    C: ConnectionTrait,
{
    flow::Entity::find_by_id(flow_id)
        .filter(flow::Column::ProfileId.eq(profile_id))
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::NotFound("flow not found".to_string()))
}

pub async fn owned_budget<C>(db: &C, profile_id: i32, budget_id: i32) -> Result<budget::Model>
where
    C: ConnectionTrait,
{
    budget::Entity::find_by_id(budget_id)
        .filter(budget::Column::ProfileId.eq(profile_id))
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::NotFound("budget not found".to_string()))
}

pub async fn owned_goal<C>(db: &C, profile_id: i32, goal_id: i32) -> Result<goal::Model>
where
    C: ConnectionTrait,
{
    goal::Entity::find_by_id(goal_id)
        .filter(goal::Column::ProfileId.eq(profile_id))
        .one(db)
        .await?
        .ok_or_else(|| LedgerError::NotFound("goal not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{create_user, setup_db};

    #[tokio::test]
    async fn test_authorize_own_profile() {
        let db = setup_db().await.unwrap();
        let (user, owner) = create_user(&db, "a@example.com").await.unwrap();

        let profile = authorize_profile(&db, user.id, owner.id).await.unwrap();
        assert_eq!(profile.id, owner.id);
        assert!(profile.is_owner);
    }

    #[tokio::test]
    async fn test_foreign_and_missing_profiles_are_forbidden() {
        let db = setup_db().await.unwrap();
        let (alice, _) = create_user(&db, "alice@example.com").await.unwrap();
        let (_, bobs_profile) = create_user(&db, "bob@example.com").await.unwrap();

        let foreign = authorize_profile(&db, alice.id, bobs_profile.id).await;
        assert!(matches!(foreign, Err(LedgerError::Forbidden(_))));

        let missing = authorize_profile(&db, alice.id, 9999).await;
        assert!(matches!(missing, Err(LedgerError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_nested_resource_of_other_profile_is_not_found() {
        let db = setup_db().await.unwrap();
        let (_, first) = create_user(&db, "first@example.com").await.unwrap();
        let (_, second) = create_user(&db, "second@example.com").await.unwrap();

        let node = crate::testing::insert_node(&db, first.id, "Checking").await.unwrap();

        assert!(owned_node(&db, first.id, node.id).await.is_ok());
        assert!(matches!(
            owned_node(&db, second.id, node.id).await,
            Err(LedgerError::NotFound(_))
        ));
    }
}

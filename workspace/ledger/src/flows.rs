//! Directed money movements between two nodes of the same profile.

use chrono::{DateTime, Utc};
use common::{CreateFlowRequest, FlowDto, UpdateFlowRequest};
use model::entities::flow;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info, instrument};

use crate::error::{LedgerError, Result};
use crate::gate::{authorize_profile, owned_flow, owned_node};
use crate::input::non_empty;

pub fn flow_dto(model: flow::Model) -> FlowDto {
    FlowDto {
        id: model.id,
        profile_id: model.profile_id,
        from_node_id: model.from_node_id,
        to_node_id: model.to_node_id,
        amount: model.amount.normalize(),
        label: model.label,
        is_recurring: model.is_recurring,
        created_at: model.created_at,
    }
}

#[instrument(skip(db))]
pub async fn list_flows(db: &DatabaseConnection, user_id: i32, profile_id: i32) -> Result<Vec<FlowDto>> {
    authorize_profile(db, user_id, profile_id).await?;

    let flows = flow::Entity::find()
        .filter(flow::Column::ProfileId.eq(profile_id))
        .order_by_asc(flow::Column::Id)
        .all(db)
        .await?;

    debug!("Retrieved {} flows for profile {}", flows.len(), profile_id);
    Ok(flows.into_iter().map(flow_dto).collect())
}

/// Self-loops and cycles are allowed; both endpoints must live in the profile.
#[instrument(skip(db, request))]
pub async fn create_flow(
    db: &DatabaseConnection,
    user_id: i32,
    profile_id: i32,
    request: &CreateFlowRequest,
    now: DateTime<Utc>,
) -> Result<FlowDto> {
    authorize_profile(db, user_id, profile_id).await?;
    owned_node(db, profile_id, request.from_node_id).await?;
    owned_node(db, profile_id, request.to_node_id).await?;

    let created = flow::ActiveModel {
        profile_id: Set(profile_id),
        from_node_id: Set(request.from_node_id),
        to_node_id: Set(request.to_node_id),
        amount: Set(request.amount),
        label: Set(non_empty(request.label.as_deref())),
        is_recurring: Set(request.is_recurring),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        "Created flow {} ({} -> {}) in profile {}",
        created.id, created.from_node_id, created.to_node_id, profile_id
    );
    Ok(flow_dto(created))
}

#[instrument(skip(db, request))]
pub async fn update_flow(
    db: &DatabaseConnection,
    user_id: i32,
    profile_id: i32,
    flow_id: i32,
    request: &UpdateFlowRequest,
) -> Result<FlowDto> {
    authorize_profile(db, user_id, profile_id).await?;
    let existing = owned_flow(db, profile_id, flow_id).await?;

    let mut active: flow::ActiveModel = existing.into();
    active.amount = Set(request.amount);
    active.label = Set(non_empty(request.label.as_deref()));
    active.is_recurring = Set(request.is_recurring);

    let updated = active.update(db).await?;
    info!("Updated flow {} in profile {}", flow_id, profile_id);
    Ok(flow_dto(updated))
}

#[instrument(skip(db))]
pub async fn delete_flow(db: &DatabaseConnection, user_id: i32, profile_id: i32, flow_id: i32) -> Result<()> {
    authorize_profile(db, user_id, profile_id).await?;

    let deleted = flow::Entity::delete_many()
        .filter(flow::Column::Id.eq(flow_id))
        .filter(flow::Column::ProfileId.eq(profile_id))
        .exec(db)
        .await?;

    if deleted.rows_affected == 0 {
        return Err(LedgerError::NotFound("flow not found".to_string()));
    }

    info!("Deleted flow {} from profile {}", flow_id, profile_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{create_user, insert_node, setup_db};
    use rust_decimal_macros::dec;

    fn request(from: i32, to: i32) -> CreateFlowRequest {
        CreateFlowRequest {
            from_node_id: from,
            to_node_id: to,
            amount: dec!(250),
            label: Some("Transfer".to_string()),
            is_recurring: true,
        }
    }

    #[tokio::test]
    async fn test_create_list_update_delete() {
        let db = setup_db().await.unwrap();
        let (user, profile) = create_user(&db, "flows@example.com").await.unwrap();
        let from = insert_node(&db, profile.id, "Checking").await.unwrap();
        let to = insert_node(&db, profile.id, "Savings").await.unwrap();

        let created = create_flow(&db, user.id, profile.id, &request(from.id, to.id), Utc::now())
            .await
            .unwrap();
        assert_eq!(created.amount, dec!(250));

        let updated = update_flow(
            &db,
            user.id,
            profile.id,
            created.id,
            &UpdateFlowRequest {
                amount: dec!(0),
                label: None,
                is_recurring: false,
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.amount, dec!(0));
        assert_eq!(updated.label, None);
        assert!(!updated.is_recurring);

        assert_eq!(list_flows(&db, user.id, profile.id).await.unwrap().len(), 1);

        delete_flow(&db, user.id, profile.id, created.id).await.unwrap();
        assert!(matches!(
            delete_flow(&db, user.id, profile.id, created.id).await,
            Err(LedgerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_self_loop_is_allowed() {
        let db = setup_db().await.unwrap();
        let (user, profile) = create_user(&db, "loop@example.com").await.unwrap();
        let node = insert_node(&db, profile.id, "Brokerage").await.unwrap();

        let created = create_flow(&db, user.id, profile.id, &request(node.id, node.id), Utc::now()).await;
        assert!(created.is_ok());
    }

    #[tokio::test]
    async fn test_endpoint_from_another_profile_is_not_found() {
        let db = setup_db().await.unwrap();
        let (user, profile) = create_user(&db, "mine@example.com").await.unwrap();
        let (_, other) = create_user(&db, "other@example.com").await.unwrap();
        let mine = insert_node(&db, profile.id, "Checking").await.unwrap();
        let theirs = insert_node(&db, other.id, "Their savings").await.unwrap();

        let result = create_flow(&db, user.id, profile.id, &request(mine.id, theirs.id), Utc::now()).await;
        assert!(matches!(result, Err(LedgerError::NotFound(_))));
    }
}

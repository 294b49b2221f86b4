//! Vertices of a profile's cash-flow graph.

use chrono::{DateTime, Utc};
use common::{CreateNodeRequest, NodeDto, UpdateNodeRequest};
use model::entities::{flow, node};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{LedgerError, Result};
use crate::gate::{authorize_profile, owned_node};
use crate::input::non_empty;

const EMPTY_METADATA: &str = "{}";

pub fn node_dto(model: node::Model) -> NodeDto {
    NodeDto {
        id: model.id,
        profile_id: model.profile_id,
        kind: model.kind.to_string(),
        label: model.label,
        institution: model.institution,
        amount: model.amount.normalize(),
        balance: model.balance.normalize(),
        apy: model.apy.normalize(),
        budgeted: model.budgeted.normalize(),
        goal: model.goal.normalize(),
        metadata: model.metadata,
        sort_order: model.sort_order,
        created_at: model.created_at,
    }
}

/// Parses a client-supplied node kind. `goal` nodes only come from goals.
fn client_node_kind(raw: &str) -> Result<node::NodeKind> {
    let kind: node::NodeKind = raw
        .parse()
        .map_err(|_| LedgerError::InvalidInput("invalid node type".to_string()))?;
    if !kind.is_client_creatable() {
        return Err(LedgerError::InvalidInput("invalid node type".to_string()));
    }
    Ok(kind)
}

#[instrument(skip(db))]
pub async fn list_nodes(db: &DatabaseConnection, user_id: i32, profile_id: i32) -> Result<Vec<NodeDto>> {
    authorize_profile(db, user_id, profile_id).await?;

    let nodes = node::Entity::find()
        .filter(node::Column::ProfileId.eq(profile_id))
        .order_by_asc(node::Column::SortOrder)
        .order_by_asc(node::Column::CreatedAt)
        .order_by_asc(node::Column::Id)
        .all(db)
        .await?;

    debug!("Retrieved {} nodes for profile {}", nodes.len(), profile_id);
    Ok(nodes.into_iter().map(node_dto).collect())
}

#[instrument(skip(db, request), fields(kind = %request.kind))]
pub async fn create_node(
    db: &DatabaseConnection,
    user_id: i32,
    profile_id: i32,
    request: &CreateNodeRequest,
    now: DateTime<Utc>,
) -> Result<NodeDto> {
    authorize_profile(db, user_id, profile_id).await?;

    let kind = client_node_kind(&request.kind).inspect_err(|_| {
        warn!("Rejected node type '{}'", request.kind);
    })?;
    let label = non_empty(Some(&request.label))
        .ok_or_else(|| LedgerError::InvalidInput("label is required".to_string()))?;

    let created = node::ActiveModel {
        profile_id: Set(profile_id),
        kind: Set(kind),
        label: Set(label),
        institution: Set(non_empty(request.institution.as_deref())),
        amount: Set(request.amount),
        balance: Set(request.balance),
        apy: Set(request.apy),
        budgeted: Set(request.budgeted),
        goal: Set(request.goal),
        metadata: Set(non_empty(request.metadata.as_deref()).unwrap_or_else(|| EMPTY_METADATA.to_string())),
        sort_order: Set(request.sort_order),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created {} node {} in profile {}", created.kind, created.id, profile_id);
    Ok(node_dto(created))
}

/// Label and metadata are kept when empty; institution and every numeric
/// field are overwritten, zero included.
#[instrument(skip(db, request))]
pub async fn update_node(
    db: &DatabaseConnection,
    user_id: i32,
    profile_id: i32,
    node_id: i32,
    request: &UpdateNodeRequest,
) -> Result<NodeDto> {
    authorize_profile(db, user_id, profile_id).await?;
    let existing = owned_node(db, profile_id, node_id).await?;

    let mut active: node::ActiveModel = existing.into();
    if let Some(label) = non_empty(request.label.as_deref()) {
        active.label = Set(label);
    }
    if let Some(metadata) = non_empty(request.metadata.as_deref()) {
        active.metadata = Set(metadata);
    }
    if let Some(sort_order) = request.sort_order {
        active.sort_order = Set(sort_order);
    }
    active.institution = Set(non_empty(request.institution.as_deref()));
    active.amount = Set(request.amount);
    active.balance = Set(request.balance);
    active.apy = Set(request.apy);
    active.budgeted = Set(request.budgeted);
    active.goal = Set(request.goal);

    let updated = active.update(db).await?;
    info!("Updated node {} in profile {}", node_id, profile_id);
    Ok(node_dto(updated))
}

/// Removes the flows touching the node, then the node itself.
///
/// The two deletes are independent statements: a retry after a failure
/// between them finds no flows left and proceeds to the node.
#[instrument(skip(db))]
pub async fn delete_node(db: &DatabaseConnection, user_id: i32, profile_id: i32, node_id: i32) -> Result<()> {
    authorize_profile(db, user_id, profile_id).await?;
    owned_node(db, profile_id, node_id).await?;

    let flows = flow::Entity::delete_many()
        .filter(
            Condition::any()
                .add(flow::Column::FromNodeId.eq(node_id))
                .add(flow::Column::ToNodeId.eq(node_id)),
        )
        .exec(db)
        .await?;
    debug!("Deleted {} flows referencing node {}", flows.rows_affected, node_id);

    let deleted = node::Entity::delete_many()
        .filter(node::Column::Id.eq(node_id))
        .filter(node::Column::ProfileId.eq(profile_id))
        .exec(db)
        .await?;

    if deleted.rows_affected == 0 {
        warn!("Node {} vanished before it could be deleted", node_id);
        return Err(LedgerError::NotFound("node not found".to_string()));
    }

    info!("Deleted node {} from profile {}", node_id, profile_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budgets::create_budget;
    use crate::testing::{create_user, setup_db};
    use common::CreateBudgetRequest;
    use model::entities::budget;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use sea_orm::PaginatorTrait;

    fn request(kind: &str, label: &str) -> CreateNodeRequest {
        CreateNodeRequest {
            kind: kind.to_string(),
            label: label.to_string(),
            institution: None,
            amount: Decimal::ZERO,
            balance: Decimal::ZERO,
            apy: Decimal::ZERO,
            budgeted: Decimal::ZERO,
            goal: Decimal::ZERO,
            metadata: None,
            sort_order: 0,
        }
    }

    #[tokio::test]
    async fn test_goal_kind_is_not_client_creatable() {
        let db = setup_db().await.unwrap();
        let (user, profile) = create_user(&db, "nodes@example.com").await.unwrap();

        let goal = create_node(&db, user.id, profile.id, &request("goal", "Trip"), Utc::now()).await;
        assert!(matches!(goal, Err(LedgerError::InvalidInput(_))));

        let unknown = create_node(&db, user.id, profile.id, &request("loan", "Car"), Utc::now()).await;
        assert!(matches!(unknown, Err(LedgerError::InvalidInput(_))));

        assert_eq!(node::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_defaults_metadata() {
        let db = setup_db().await.unwrap();
        let (user, profile) = create_user(&db, "meta@example.com").await.unwrap();

        let mut income = request("income", "Salary");
        income.amount = dec!(5200);
        let created = create_node(&db, user.id, profile.id, &income, Utc::now()).await.unwrap();

        assert_eq!(created.kind, "income");
        assert_eq!(created.metadata, "{}");
        assert_eq!(created.amount, dec!(5200));
    }

    #[tokio::test]
    async fn test_update_keeps_label_and_overwrites_numbers() {
        let db = setup_db().await.unwrap();
        let (user, profile) = create_user(&db, "update@example.com").await.unwrap();

        let mut savings = request("savings", "Emergency fund");
        savings.balance = dec!(900);
        savings.apy = dec!(4.5);
        savings.institution = Some("Credit Union".to_string());
        savings.metadata = Some(r#"{"x":1}"#.to_string());
        let created = create_node(&db, user.id, profile.id, &savings, Utc::now()).await.unwrap();

        let updated = update_node(
            &db,
            user.id,
            profile.id,
            created.id,
            &UpdateNodeRequest {
                label: Some(String::new()),
                balance: dec!(1000),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.label, "Emergency fund");
        assert_eq!(updated.metadata, r#"{"x":1}"#);
        assert_eq!(updated.balance, dec!(1000));
        assert_eq!(updated.apy, Decimal::ZERO);
        assert_eq!(updated.institution, None);
    }

    #[tokio::test]
    async fn test_delete_removes_referencing_flows() {
        let db = setup_db().await.unwrap();
        let (user, profile) = create_user(&db, "graph@example.com").await.unwrap();
        let now = Utc::now();

        let income = create_node(&db, user.id, profile.id, &request("income", "Job"), now).await.unwrap();
        let account = create_node(&db, user.id, profile.id, &request("account", "Bank"), now).await.unwrap();
        let expense = create_node(&db, user.id, profile.id, &request("expense", "Rent"), now).await.unwrap();

        for (from, to) in [(income.id, account.id), (account.id, expense.id), (income.id, expense.id)] {
            flow::ActiveModel {
                profile_id: Set(profile.id),
                from_node_id: Set(from),
                to_node_id: Set(to),
                amount: Set(dec!(100)),
                label: Set(None),
                is_recurring: Set(true),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&db)
            .await
            .unwrap();
        }

        delete_node(&db, user.id, profile.id, account.id).await.unwrap();

        let remaining = flow::Entity::find().all(&db).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(remaining.iter().all(|f| f.from_node_id != account.id && f.to_node_id != account.id));

        let again = delete_node(&db, user.id, profile.id, account.id).await;
        assert!(matches!(again, Err(LedgerError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_linked_budgets() {
        let db = setup_db().await.unwrap();
        let (user, profile) = create_user(&db, "linked@example.com").await.unwrap();
        let now = Utc::now();

        let rent = create_node(&db, user.id, profile.id, &request("expense", "Rent"), now).await.unwrap();
        let groceries = create_node(&db, user.id, profile.id, &request("expense", "Food"), now).await.unwrap();
        for (node_id, name) in [(Some(rent.id), "Rent"), (Some(groceries.id), "Food"), (None, "Misc")] {
            let budget = CreateBudgetRequest {
                node_id,
                name: name.to_string(),
                budgeted: dec!(250),
                period: None,
                color: None,
            };
            create_budget(&db, user.id, profile.id, &budget, now).await.unwrap();
        }

        delete_node(&db, user.id, profile.id, rent.id).await.unwrap();

        let names: Vec<String> = budget::Entity::find().all(&db).await.unwrap().into_iter().map(|b| b.name).collect();
        assert_eq!(names.len(), 2);
        assert!(!names.contains(&"Rent".to_string()));
    }

    #[tokio::test]
    async fn test_cross_owner_node_access_is_forbidden() {
        let db = setup_db().await.unwrap();
        let (owner, profile) = create_user(&db, "owner@example.com").await.unwrap();
        let (intruder, _) = create_user(&db, "intruder@example.com").await.unwrap();
        let node = create_node(&db, owner.id, profile.id, &request("account", "Bank"), Utc::now())
            .await
            .unwrap();

        let listed = list_nodes(&db, intruder.id, profile.id).await;
        assert!(matches!(listed, Err(LedgerError::Forbidden(_))));

        let deleted = delete_node(&db, intruder.id, profile.id, node.id).await;
        assert!(matches!(deleted, Err(LedgerError::Forbidden(_))));
        assert_eq!(node::Entity::find().count(&db).await.unwrap(), 1);
    }
}

//! Savings goals and their contribution ledgers.
//!
//! `goals.current` is a running total. It starts at the value supplied on
//! creation and afterwards only moves through contribution writes, each of
//! which updates it with a single `current = current ± amount` statement in
//! the same store transaction as the ledger row. It is never recomputed
//! from the ledger on read.

use chrono::{DateTime, Utc};
use common::{
    CreateGoalRequest, CreateGoalTransactionRequest, GoalDto, GoalTransactionDto, UpdateGoalRequest,
};
use model::entities::{goal, goal_transaction, node};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, warn};

use crate::budgets::LEDGER_PAGE_SIZE;
use crate::error::{LedgerError, Result};
use crate::gate::{authorize_profile, owned_goal};
use crate::input::{entry_date, non_empty, optional_date};

pub fn goal_dto(model: goal::Model, now: DateTime<Utc>) -> Result<GoalDto> {
    let metrics = compute::goal_metrics(model.target, model.current, model.deadline, now)?;

    Ok(GoalDto {
        id: model.id,
        profile_id: model.profile_id,
        node_id: model.node_id,
        name: model.name,
        target: model.target.normalize(),
        current: model.current.normalize(),
        deadline: model.deadline,
        priority: model.priority,
        color: model.color,
        created_at: model.created_at,
        percentage: metrics.percentage,
        days_remaining: metrics.days_remaining,
        monthly_needed: metrics.monthly_needed,
    })
}

pub fn goal_transaction_dto(model: goal_transaction::Model) -> GoalTransactionDto {
    GoalTransactionDto {
        id: model.id,
        goal_id: model.goal_id,
        amount: model.amount.normalize(),
        note: model.note,
        date: model.date,
        created_at: model.created_at,
    }
}

/// Applies `current = current + delta` to one goal.
async fn shift_current<C>(db: &C, goal_id: i32, delta: Decimal) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = goal::Entity::update_many()
        .col_expr(goal::Column::Current, Expr::col(goal::Column::Current).add(delta))
        .filter(goal::Column::Id.eq(goal_id))
        .exec(db)
        .await?;

    if result.rows_affected != 1 {
        warn!("Goal {} disappeared while adjusting its balance", goal_id);
        return Err(LedgerError::NotFound("goal not found".to_string()));
    }
    Ok(())
}

/// Ordered by priority, then deadline.
#[instrument(skip(db))]
pub async fn list_goals(
    db: &DatabaseConnection,
    user_id: i32,
    profile_id: i32,
    now: DateTime<Utc>,
) -> Result<Vec<GoalDto>> {
    authorize_profile(db, user_id, profile_id).await?;

    let goals = goal::Entity::find()
        .filter(goal::Column::ProfileId.eq(profile_id))
        .order_by_asc(goal::Column::Priority)
        .order_by_asc(goal::Column::Deadline)
        .order_by_asc(goal::Column::Id)
        .all(db)
        .await?;

    debug!("Retrieved {} goals for profile {}", goals.len(), profile_id);
    goals.into_iter().map(|model| goal_dto(model, now)).collect()
}

/// Creates the companion `goal` node and the goal in one unit.
#[instrument(skip(db, request))]
pub async fn create_goal(
    db: &DatabaseConnection,
    user_id: i32,
    profile_id: i32,
    request: &CreateGoalRequest,
    now: DateTime<Utc>,
) -> Result<GoalDto> {
    authorize_profile(db, user_id, profile_id).await?;

    let name = non_empty(Some(&request.name))
        .ok_or_else(|| LedgerError::InvalidInput("name is required".to_string()))?;
    let deadline = optional_date(request.deadline.as_deref())?;
    let color = non_empty(request.color.as_deref())
        .unwrap_or_else(|| goal::DEFAULT_GOAL_COLOR.to_string());

    let txn = db.begin().await?;

    let companion = node::ActiveModel {
        profile_id: Set(profile_id),
        kind: Set(node::NodeKind::Goal),
        label: Set(name.clone()),
        institution: Set(None),
        amount: Set(Decimal::ZERO),
        balance: Set(request.current),
        apy: Set(Decimal::ZERO),
        budgeted: Set(Decimal::ZERO),
        goal: Set(request.target),
        metadata: Set("{}".to_string()),
        sort_order: Set(0),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let created = goal::ActiveModel {
        profile_id: Set(profile_id),
        node_id: Set(Some(companion.id)),
        name: Set(name),
        target: Set(request.target),
        current: Set(request.current),
        deadline: Set(deadline),
        priority: Set(request.priority),
        color: Set(color),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(
        "Created goal {} with companion node {} in profile {}",
        created.id, companion.id, profile_id
    );
    goal_dto(created, now)
}

/// Overwrites the goal's fields. The companion node is left as it is.
#[instrument(skip(db, request))]
pub async fn update_goal(
    db: &DatabaseConnection,
    user_id: i32,
    profile_id: i32,
    goal_id: i32,
    request: &UpdateGoalRequest,
    now: DateTime<Utc>,
) -> Result<GoalDto> {
    authorize_profile(db, user_id, profile_id).await?;
    let existing = owned_goal(db, profile_id, goal_id).await?;

    let name = non_empty(Some(&request.name))
        .ok_or_else(|| LedgerError::InvalidInput("name is required".to_string()))?;
    let deadline = optional_date(request.deadline.as_deref())?;

    if existing.node_id.is_some()
        && (existing.target != request.target || existing.current != request.current)
    {
        debug!(
            "Goal {} target/current changed; companion node {:?} keeps its creation values",
            goal_id, existing.node_id
        );
    }

    let mut active: goal::ActiveModel = existing.into();
    active.name = Set(name);
    active.target = Set(request.target);
    active.current = Set(request.current);
    active.deadline = Set(deadline);
    active.priority = Set(request.priority);
    if let Some(color) = non_empty(request.color.as_deref()) {
        active.color = Set(color);
    }

    let updated = active.update(db).await?;
    info!("Updated goal {} in profile {}", goal_id, profile_id);
    goal_dto(updated, now)
}

/// Deletes the goal and its ledger. The companion node stays in the graph.
#[instrument(skip(db))]
pub async fn delete_goal(db: &DatabaseConnection, user_id: i32, profile_id: i32, goal_id: i32) -> Result<()> {
    authorize_profile(db, user_id, profile_id).await?;

    let deleted = goal::Entity::delete_many()
        .filter(goal::Column::Id.eq(goal_id))
        .filter(goal::Column::ProfileId.eq(profile_id))
        .exec(db)
        .await?;

    if deleted.rows_affected == 0 {
        return Err(LedgerError::NotFound("goal not found".to_string()));
    }

    info!("Deleted goal {} from profile {}", goal_id, profile_id);
    Ok(())
}

#[instrument(skip(db))]
pub async fn list_goal_transactions(
    db: &DatabaseConnection,
    user_id: i32,
    profile_id: i32,
    goal_id: i32,
) -> Result<Vec<GoalTransactionDto>> {
    authorize_profile(db, user_id, profile_id).await?;
    owned_goal(db, profile_id, goal_id).await?;

    let rows = goal_transaction::Entity::find()
        .filter(goal_transaction::Column::GoalId.eq(goal_id))
        .order_by_desc(goal_transaction::Column::Date)
        .order_by_desc(goal_transaction::Column::CreatedAt)
        .order_by_desc(goal_transaction::Column::Id)
        .limit(LEDGER_PAGE_SIZE)
        .all(db)
        .await?;

    debug!("Retrieved {} contributions for goal {}", rows.len(), goal_id);
    Ok(rows.into_iter().map(goal_transaction_dto).collect())
}

/// Records a contribution and raises `current` by its amount, atomically.
#[instrument(skip(db, request))]
pub async fn create_goal_transaction(
    db: &DatabaseConnection,
    user_id: i32,
    profile_id: i32,
    goal_id: i32,
    request: &CreateGoalTransactionRequest,
    now: DateTime<Utc>,
) -> Result<GoalTransactionDto> {
    authorize_profile(db, user_id, profile_id).await?;
    owned_goal(db, profile_id, goal_id).await?;

    let date = entry_date(request.date.as_deref(), now.date_naive())?;

    let txn = db.begin().await?;

    let created = goal_transaction::ActiveModel {
        goal_id: Set(goal_id),
        amount: Set(request.amount),
        note: Set(non_empty(request.note.as_deref())),
        date: Set(date),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    shift_current(&txn, goal_id, request.amount).await?;
    txn.commit().await?;

    info!("Recorded contribution {} of {} to goal {}", created.id, created.amount, goal_id);
    Ok(goal_transaction_dto(created))
}

/// Removes a contribution and lowers `current` by the stored amount, atomically.
#[instrument(skip(db))]
pub async fn delete_goal_transaction(
    db: &DatabaseConnection,
    user_id: i32,
    profile_id: i32,
    goal_id: i32,
    transaction_id: i32,
) -> Result<()> {
    authorize_profile(db, user_id, profile_id).await?;
    owned_goal(db, profile_id, goal_id).await?;

    let txn = db.begin().await?;

    let stored = goal_transaction::Entity::find_by_id(transaction_id)
        .filter(goal_transaction::Column::GoalId.eq(goal_id))
        .one(&txn)
        .await?
        .ok_or_else(|| LedgerError::NotFound("transaction not found".to_string()))?;

    let deleted = goal_transaction::Entity::delete_many()
        .filter(goal_transaction::Column::Id.eq(stored.id))
        .filter(goal_transaction::Column::GoalId.eq(goal_id))
        .exec(&txn)
        .await?;
    if deleted.rows_affected != 1 {
        return Err(LedgerError::NotFound("transaction not found".to_string()));
    }

    shift_current(&txn, goal_id, -stored.amount).await?;
    txn.commit().await?;

    info!("Deleted contribution {} of {} from goal {}", stored.id, stored.amount, goal_id);
    Ok(())
}

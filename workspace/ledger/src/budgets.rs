//! Budgets and their transaction ledgers.
//!
//! Transactions are immutable rows; a budget stores no running total.
//! `spent` is summed from the rows dated in the current calendar month on
//! every read, whatever the budget's own period is.

use chrono::{DateTime, NaiveDate, Utc};
use common::{BudgetDto, CreateBudgetRequest, CreateTransactionRequest, TransactionDto, UpdateBudgetRequest};
use compute::{BudgetMetrics, PeriodWindow, SpendTracker};
use model::entities::budget::{self, BudgetPeriod};
use model::entities::transaction;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::{debug, info, instrument, trace};

use crate::error::{LedgerError, Result};
use crate::gate::{authorize_profile, owned_budget, owned_node};
use crate::input::{entry_date, non_empty};

/// Newest-first listings are capped at this many rows.
pub const LEDGER_PAGE_SIZE: u64 = 100;

pub fn budget_dto(model: budget::Model, metrics: BudgetMetrics) -> BudgetDto {
    BudgetDto {
        id: model.id,
        profile_id: model.profile_id,
        node_id: model.node_id,
        name: model.name,
        budgeted: model.budgeted.normalize(),
        period: model.period.as_str().to_string(),
        color: model.color,
        created_at: model.created_at,
        spent: metrics.spent,
        remaining: metrics.remaining,
        percentage: metrics.percentage,
    }
}

pub fn transaction_dto(model: transaction::Model) -> TransactionDto {
    TransactionDto {
        id: model.id,
        budget_id: model.budget_id,
        amount: model.amount.normalize(),
        note: model.note,
        date: model.date,
        created_at: model.created_at,
    }
}

fn parse_period(raw: Option<&str>) -> Result<Option<BudgetPeriod>> {
    non_empty(raw)
        .map(|value| {
            value
                .parse::<BudgetPeriod>()
                .map_err(LedgerError::InvalidInput)
        })
        .transpose()
}

/// Sums the window's transactions for the given budgets.
async fn spend_in_window<C>(db: &C, budget_ids: &[i32], window: PeriodWindow) -> Result<SpendTracker>
where
    C: ConnectionTrait,
{
    let mut tracker = SpendTracker::new(window);
    if budget_ids.is_empty() {
        return Ok(tracker);
    }

    let entries = transaction::Entity::find()
        .filter(transaction::Column::BudgetId.is_in(budget_ids.iter().copied()))
        .filter(transaction::Column::Date.gte(window.start))
        .filter(transaction::Column::Date.lt(window.end))
        .all(db)
        .await?;

    trace!("Summing {} transactions between {} and {}", entries.len(), window.start, window.end);
    for entry in entries {
        tracker.record(entry.budget_id, entry.amount, entry.date)?;
    }
    Ok(tracker)
}

async fn with_current_spend<C>(db: &C, model: budget::Model, today: NaiveDate) -> Result<BudgetDto>
where
    C: ConnectionTrait,
{
    let window = PeriodWindow::current_month(today)?;
    let tracker = spend_in_window(db, &[model.id], window).await?;
    let metrics = tracker.metrics(model.id, model.budgeted)?;
    Ok(budget_dto(model, metrics))
}

/// All budgets of the profile, by name, with this month's spend.
#[instrument(skip(db))]
pub async fn list_budgets(
    db: &DatabaseConnection,
    user_id: i32,
    profile_id: i32,
    today: NaiveDate,
) -> Result<Vec<BudgetDto>> {
    authorize_profile(db, user_id, profile_id).await?;

    let budgets = budget::Entity::find()
        .filter(budget::Column::ProfileId.eq(profile_id))
        .order_by_asc(budget::Column::Name)
        .order_by_asc(budget::Column::Id)
        .all(db)
        .await?;

    let window = PeriodWindow::current_month(today)?;
    let ids: Vec<i32> = budgets.iter().map(|b| b.id).collect();
    let tracker = spend_in_window(db, &ids, window).await?;

    let mut dtos = Vec::with_capacity(budgets.len());
    for model in budgets {
        let metrics = tracker.metrics(model.id, model.budgeted)?;
        dtos.push(budget_dto(model, metrics));
    }

    debug!("Retrieved {} budgets for profile {}", dtos.len(), profile_id);
    Ok(dtos)
}

#[instrument(skip(db, request))]
pub async fn create_budget(
    db: &DatabaseConnection,
    user_id: i32,
    profile_id: i32,
    request: &CreateBudgetRequest,
    now: DateTime<Utc>,
) -> Result<BudgetDto> {
    authorize_profile(db, user_id, profile_id).await?;

    let name = non_empty(Some(&request.name))
        .ok_or_else(|| LedgerError::InvalidInput("name is required".to_string()))?;
    let period = parse_period(request.period.as_deref())?.unwrap_or(BudgetPeriod::Monthly);
    let color = non_empty(request.color.as_deref())
        .unwrap_or_else(|| budget::DEFAULT_BUDGET_COLOR.to_string());
    if let Some(node_id) = request.node_id {
        owned_node(db, profile_id, node_id).await?;
    }

    let created = budget::ActiveModel {
        profile_id: Set(profile_id),
        node_id: Set(request.node_id),
        name: Set(name),
        budgeted: Set(request.budgeted),
        period: Set(period),
        color: Set(color),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created budget {} in profile {}", created.id, profile_id);
    with_current_spend(db, created, now.date_naive()).await
}

/// Name and amount are overwritten; period and color only when supplied.
#[instrument(skip(db, request))]
pub async fn update_budget(
    db: &DatabaseConnection,
    user_id: i32,
    profile_id: i32,
    budget_id: i32,
    request: &UpdateBudgetRequest,
    today: NaiveDate,
) -> Result<BudgetDto> {
    authorize_profile(db, user_id, profile_id).await?;
    let existing = owned_budget(db, profile_id, budget_id).await?;

    let name = non_empty(Some(&request.name))
        .ok_or_else(|| LedgerError::InvalidInput("name is required".to_string()))?;

    let mut active: budget::ActiveModel = existing.into();
    active.name = Set(name);
    active.budgeted = Set(request.budgeted);
    if let Some(period) = parse_period(request.period.as_deref())? {
        active.period = Set(period);
    }
    if let Some(color) = non_empty(request.color.as_deref()) {
        active.color = Set(color);
    }

    let updated = active.update(db).await?;
    info!("Updated budget {} in profile {}", budget_id, profile_id);
    with_current_spend(db, updated, today).await
}

/// Deletes the budget together with its transactions.
#[instrument(skip(db))]
pub async fn delete_budget(db: &DatabaseConnection, user_id: i32, profile_id: i32, budget_id: i32) -> Result<()> {
    authorize_profile(db, user_id, profile_id).await?;

    let deleted = budget::Entity::delete_many()
        .filter(budget::Column::Id.eq(budget_id))
        .filter(budget::Column::ProfileId.eq(profile_id))
        .exec(db)
        .await?;

    if deleted.rows_affected == 0 {
        return Err(LedgerError::NotFound("budget not found".to_string()));
    }

    info!("Deleted budget {} from profile {}", budget_id, profile_id);
    Ok(())
}

/// Newest first: by date, then by creation time.
#[instrument(skip(db))]
pub async fn list_transactions(
    db: &DatabaseConnection,
    user_id: i32,
    profile_id: i32,
    budget_id: i32,
) -> Result<Vec<TransactionDto>> {
    authorize_profile(db, user_id, profile_id).await?;
    owned_budget(db, profile_id, budget_id).await?;

    let rows = transaction::Entity::find()
        .filter(transaction::Column::BudgetId.eq(budget_id))
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::CreatedAt)
        .order_by_desc(transaction::Column::Id)
        .limit(LEDGER_PAGE_SIZE)
        .all(db)
        .await?;

    debug!("Retrieved {} transactions for budget {}", rows.len(), budget_id);
    Ok(rows.into_iter().map(transaction_dto).collect())
}

#[instrument(skip(db, request))]
pub async fn create_transaction(
    db: &DatabaseConnection,
    user_id: i32,
    profile_id: i32,
    budget_id: i32,
    request: &CreateTransactionRequest,
    now: DateTime<Utc>,
) -> Result<TransactionDto> {
    authorize_profile(db, user_id, profile_id).await?;
    owned_budget(db, profile_id, budget_id).await?;

    let date = entry_date(request.date.as_deref(), now.date_naive())?;

    let created = transaction::ActiveModel {
        budget_id: Set(budget_id),
        amount: Set(request.amount),
        note: Set(non_empty(request.note.as_deref())),
        date: Set(date),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Recorded transaction {} of {} on budget {}", created.id, created.amount, budget_id);
    Ok(transaction_dto(created))
}

#[instrument(skip(db))]
pub async fn delete_transaction(
    db: &DatabaseConnection,
    user_id: i32,
    profile_id: i32,
    budget_id: i32,
    transaction_id: i32,
) -> Result<()> {
    authorize_profile(db, user_id, profile_id).await?;
    owned_budget(db, profile_id, budget_id).await?;

    let deleted = transaction::Entity::delete_many()
        .filter(transaction::Column::Id.eq(transaction_id))
        .filter(transaction::Column::BudgetId.eq(budget_id))
        .exec(db)
        .await?;

    if deleted.rows_affected == 0 {
        return Err(LedgerError::NotFound("transaction not found".to_string()));
    }

    info!("Deleted transaction {} from budget {}", transaction_id, budget_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{create_user, insert_node, setup_db};
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use sea_orm::PaginatorTrait;

    fn budget_request(name: &str, budgeted: Decimal) -> CreateBudgetRequest {
        CreateBudgetRequest {
            node_id: None,
            name: name.to_string(),
            budgeted,
            period: None,
            color: None,
        }
    }

    fn spend(amount: Decimal, date: Option<&str>) -> CreateTransactionRequest {
        CreateTransactionRequest {
            amount,
            note: None,
            date: date.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_spend_counts_only_current_month() {
        let db = setup_db().await.unwrap();
        let (user, profile) = create_user(&db, "budget@example.com").await.unwrap();
        let now = Utc.with_ymd_and_hms(2025, 3, 18, 9, 30, 0).unwrap();

        let groceries = create_budget(&db, user.id, profile.id, &budget_request("Groceries", dec!(200)), now)
            .await
            .unwrap();
        assert_eq!(groceries.period, "monthly");
        assert_eq!(groceries.color, "#10b981");
        assert_eq!(groceries.spent, Decimal::ZERO);

        create_transaction(&db, user.id, profile.id, groceries.id, &spend(dec!(50), None), now)
            .await
            .unwrap();
        create_transaction(
            &db,
            user.id,
            profile.id,
            groceries.id,
            &spend(dec!(30), Some("2025-02-28")),
            now,
        )
        .await
        .unwrap();

        let budgets = list_budgets(&db, user.id, profile.id, now.date_naive()).await.unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].spent, dec!(50));
        assert_eq!(budgets[0].remaining, dec!(150));
        assert_eq!(budgets[0].percentage, Some(dec!(25)));
    }

    #[tokio::test]
    async fn test_zero_budget_has_no_percentage() {
        let db = setup_db().await.unwrap();
        let (user, profile) = create_user(&db, "zero@example.com").await.unwrap();
        let now = Utc::now();

        let fun = create_budget(&db, user.id, profile.id, &budget_request("Fun", dec!(0)), now)
            .await
            .unwrap();
        create_transaction(&db, user.id, profile.id, fun.id, &spend(dec!(12), None), now)
            .await
            .unwrap();

        let budgets = list_budgets(&db, user.id, profile.id, now.date_naive()).await.unwrap();
        assert_eq!(budgets[0].spent, dec!(12));
        assert_eq!(budgets[0].percentage, None);
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_name() {
        let db = setup_db().await.unwrap();
        let (user, profile) = create_user(&db, "order@example.com").await.unwrap();
        let now = Utc::now();

        for name in ["Utilities", "Dining", "Rent"] {
            create_budget(&db, user.id, profile.id, &budget_request(name, dec!(10)), now)
                .await
                .unwrap();
        }

        let names: Vec<_> = list_budgets(&db, user.id, profile.id, now.date_naive())
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["Dining", "Rent", "Utilities"]);
    }

    #[tokio::test]
    async fn test_invalid_period_and_foreign_node_are_rejected() {
        let db = setup_db().await.unwrap();
        let (user, profile) = create_user(&db, "invalid@example.com").await.unwrap();
        let (_, other) = create_user(&db, "other-budget@example.com").await.unwrap();
        let foreign_node = insert_node(&db, other.id, "Not mine").await.unwrap();

        let mut bad_period = budget_request("Rent", dec!(1000));
        bad_period.period = Some("daily".to_string());
        assert!(matches!(
            create_budget(&db, user.id, profile.id, &bad_period, Utc::now()).await,
            Err(LedgerError::InvalidInput(_))
        ));

        let mut foreign = budget_request("Rent", dec!(1000));
        foreign.node_id = Some(foreign_node.id);
        assert!(matches!(
            create_budget(&db, user.id, profile.id, &foreign, Utc::now()).await,
            Err(LedgerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_period_when_absent() {
        let db = setup_db().await.unwrap();
        let (user, profile) = create_user(&db, "upd-budget@example.com").await.unwrap();
        let mut request = budget_request("Gym", dec!(40));
        request.period = Some("yearly".to_string());
        let created = create_budget(&db, user.id, profile.id, &request, Utc::now()).await.unwrap();

        let updated = update_budget(
            &db,
            user.id,
            profile.id,
            created.id,
            &UpdateBudgetRequest {
                name: "Fitness".to_string(),
                budgeted: dec!(0),
                period: None,
                color: Some("#000000".to_string()),
            },
            Utc::now().date_naive(),
        )
        .await
        .unwrap();

        assert_eq!(updated.name, "Fitness");
        assert_eq!(updated.budgeted, Decimal::ZERO);
        assert_eq!(updated.period, "yearly");
        assert_eq!(updated.color, "#000000");
    }

    #[tokio::test]
    async fn test_transactions_newest_first_and_scoped_delete() {
        let db = setup_db().await.unwrap();
        let (user, profile) = create_user(&db, "ledger@example.com").await.unwrap();
        let now = Utc::now();
        let today = now.date_naive();
        let first = create_budget(&db, user.id, profile.id, &budget_request("A", dec!(100)), now)
            .await
            .unwrap();
        let second = create_budget(&db, user.id, profile.id, &budget_request("B", dec!(100)), now)
            .await
            .unwrap();

        let older = (today - Duration::days(3)).format("%Y-%m-%d").to_string();
        let old = create_transaction(&db, user.id, profile.id, first.id, &spend(dec!(5), Some(&older)), now)
            .await
            .unwrap();
        let early = create_transaction(&db, user.id, profile.id, first.id, &spend(dec!(6), None), now)
            .await
            .unwrap();
        let late = create_transaction(
            &db,
            user.id,
            profile.id,
            first.id,
            &spend(dec!(7), None),
            now + Duration::seconds(1),
        )
        .await
        .unwrap();

        let ids: Vec<_> = list_transactions(&db, user.id, profile.id, first.id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![late.id, early.id, old.id]);

        // the transaction id exists, but not under the second budget
        let wrong_parent = delete_transaction(&db, user.id, profile.id, second.id, old.id).await;
        assert!(matches!(wrong_parent, Err(LedgerError::NotFound(_))));

        delete_transaction(&db, user.id, profile.id, first.id, old.id).await.unwrap();
        assert!(matches!(
            delete_transaction(&db, user.id, profile.id, first.id, old.id).await,
            Err(LedgerError::NotFound(_))
        ));
        assert_eq!(transaction::Entity::find().count(&db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_budget_cascades_transactions() {
        let db = setup_db().await.unwrap();
        let (user, profile) = create_user(&db, "cascade-budget@example.com").await.unwrap();
        let now = Utc::now();
        let created = create_budget(&db, user.id, profile.id, &budget_request("Travel", dec!(500)), now)
            .await
            .unwrap();
        create_transaction(&db, user.id, profile.id, created.id, &spend(dec!(80), None), now)
            .await
            .unwrap();

        delete_budget(&db, user.id, profile.id, created.id).await.unwrap();

        assert_eq!(transaction::Entity::find().count(&db).await.unwrap(), 0);
        assert!(matches!(
            create_transaction(&db, user.id, profile.id, created.id, &spend(dec!(1), None), now).await,
            Err(LedgerError::NotFound(_))
        ));
    }
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use chrono::Utc;
use common::{BudgetDto, CreateBudgetRequest, CreateTransactionRequest, TransactionDto, UpdateBudgetRequest};
use ledger::budgets;
use tracing::{debug, info, instrument, trace};

use crate::auth::AuthUser;
use crate::error::{ledger_error, HandlerError};
use crate::extract::ValidJson;
use crate::schemas::{
    ApiResponse, AppState, BudgetListResponse, BudgetResponse, ErrorResponse,
    TransactionListResponse, TransactionResponse,
};

/// List budgets with their spend for the current month
#[utoipa::path(
    get,
    path = "/api/profiles/{profile_id}/budgets",
    params(("profile_id" = i32, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Budgets ordered by name", body = BudgetListResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "budgets"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_budgets(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(profile_id): Path<i32>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<BudgetDto>>>), HandlerError> {
    trace!("Entering list_budgets function");
    let today = Utc::now().date_naive();

    let budgets = budgets::list_budgets(&state.db, user.id, profile_id, today)
        .await
        .map_err(ledger_error)?;

    debug!("Fetched {} budgets for profile {}", budgets.len(), profile_id);
    Ok((StatusCode::OK, Json(ApiResponse::ok(budgets, "Budgets retrieved successfully"))))
}

#[utoipa::path(
    post,
    path = "/api/profiles/{profile_id}/budgets",
    params(("profile_id" = i32, Path, description = "Profile ID")),
    request_body = CreateBudgetRequest,
    responses(
        (status = 201, description = "Budget created", body = BudgetResponse),
        (status = 400, description = "Invalid period or request data", body = ErrorResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 404, description = "Linked node not found in this profile", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "budgets"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn create_budget(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(profile_id): Path<i32>,
    ValidJson(request): ValidJson<CreateBudgetRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BudgetDto>>), HandlerError> {
    let budget = budgets::create_budget(&state.db, user.id, profile_id, &request, Utc::now())
        .await
        .map_err(ledger_error)?;

    info!("Created budget {} in profile {}", budget.id, profile_id);
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(budget, "Budget created successfully"))))
}

/// Update a budget's name, amount, and optionally period and color
///
/// The linked node is never changed here.
#[utoipa::path(
    put,
    path = "/api/profiles/{profile_id}/budgets/{budget_id}",
    params(
        ("profile_id" = i32, Path, description = "Profile ID"),
        ("budget_id" = i32, Path, description = "Budget ID")
    ),
    request_body = UpdateBudgetRequest,
    responses(
        (status = 200, description = "Budget updated", body = BudgetResponse),
        (status = 400, description = "Invalid period or request data", body = ErrorResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 404, description = "Budget not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "budgets"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn update_budget(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((profile_id, budget_id)): Path<(i32, i32)>,
    ValidJson(request): ValidJson<UpdateBudgetRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BudgetDto>>), HandlerError> {
    let today = Utc::now().date_naive();

    let budget = budgets::update_budget(&state.db, user.id, profile_id, budget_id, &request, today)
        .await
        .map_err(ledger_error)?;

    info!("Updated budget {}", budget_id);
    Ok((StatusCode::OK, Json(ApiResponse::ok(budget, "Budget updated successfully"))))
}

/// Delete a budget and its transactions
#[utoipa::path(
    delete,
    path = "/api/profiles/{profile_id}/budgets/{budget_id}",
    params(
        ("profile_id" = i32, Path, description = "Profile ID"),
        ("budget_id" = i32, Path, description = "Budget ID")
    ),
    responses(
        (status = 204, description = "Budget deleted"),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 404, description = "Budget not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "budgets"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_budget(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((profile_id, budget_id)): Path<(i32, i32)>,
) -> Result<StatusCode, HandlerError> {
    budgets::delete_budget(&state.db, user.id, profile_id, budget_id)
        .await
        .map_err(ledger_error)?;

    info!("Deleted budget {}", budget_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Most recent transactions of a budget, newest first (at most 100)
#[utoipa::path(
    get,
    path = "/api/profiles/{profile_id}/budgets/{budget_id}/transactions",
    params(
        ("profile_id" = i32, Path, description = "Profile ID"),
        ("budget_id" = i32, Path, description = "Budget ID")
    ),
    responses(
        (status = 200, description = "Budget transactions", body = TransactionListResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 404, description = "Budget not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "budgets"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((profile_id, budget_id)): Path<(i32, i32)>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<TransactionDto>>>), HandlerError> {
    let transactions = budgets::list_transactions(&state.db, user.id, profile_id, budget_id)
        .await
        .map_err(ledger_error)?;

    debug!("Fetched {} transactions for budget {}", transactions.len(), budget_id);
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(transactions, "Transactions retrieved successfully")),
    ))
}

/// Record spending against a budget
#[utoipa::path(
    post,
    path = "/api/profiles/{profile_id}/budgets/{budget_id}/transactions",
    params(
        ("profile_id" = i32, Path, description = "Profile ID"),
        ("budget_id" = i32, Path, description = "Budget ID")
    ),
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction recorded", body = TransactionResponse),
        (status = 400, description = "Malformed date or request data", body = ErrorResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 404, description = "Budget not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "budgets"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((profile_id, budget_id)): Path<(i32, i32)>,
    ValidJson(request): ValidJson<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionDto>>), HandlerError> {
    debug!("Recording {} against budget {}", request.amount, budget_id);

    let transaction =
        budgets::create_transaction(&state.db, user.id, profile_id, budget_id, &request, Utc::now())
            .await
            .map_err(ledger_error)?;

    info!("Created transaction {} for budget {}", transaction.id, budget_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(transaction, "Transaction created successfully")),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/profiles/{profile_id}/budgets/{budget_id}/transactions/{tx_id}",
    params(
        ("profile_id" = i32, Path, description = "Profile ID"),
        ("budget_id" = i32, Path, description = "Budget ID"),
        ("tx_id" = i32, Path, description = "Transaction ID")
    ),
    responses(
        (status = 204, description = "Transaction deleted"),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 404, description = "Budget or transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "budgets"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((profile_id, budget_id, tx_id)): Path<(i32, i32, i32)>,
) -> Result<StatusCode, HandlerError> {
    budgets::delete_transaction(&state.db, user.id, profile_id, budget_id, tx_id)
        .await
        .map_err(ledger_error)?;

    info!("Deleted transaction {} from budget {}", tx_id, budget_id);
    Ok(StatusCode::NO_CONTENT)
}

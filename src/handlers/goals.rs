use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use chrono::Utc;
use common::{
    CreateGoalRequest, CreateGoalTransactionRequest, GoalDto, GoalTransactionDto, UpdateGoalRequest,
};
use ledger::goals;
use tracing::{debug, info, instrument, trace};

use crate::auth::AuthUser;
use crate::error::{ledger_error, HandlerError};
use crate::extract::ValidJson;
use crate::schemas::{
    ApiResponse, AppState, ErrorResponse, GoalListResponse, GoalResponse,
    GoalTransactionListResponse, GoalTransactionResponse,
};

/// List goals with their progress, highest priority first
#[utoipa::path(
    get,
    path = "/api/profiles/{profile_id}/goals",
    params(("profile_id" = i32, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Goals with derived progress", body = GoalListResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "goals"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_goals(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(profile_id): Path<i32>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<GoalDto>>>), HandlerError> {
    trace!("Entering list_goals function");

    let goals = goals::list_goals(&state.db, user.id, profile_id, Utc::now())
        .await
        .map_err(ledger_error)?;

    debug!("Fetched {} goals for profile {}", goals.len(), profile_id);
    Ok((StatusCode::OK, Json(ApiResponse::ok(goals, "Goals retrieved successfully"))))
}

/// Create a goal together with its companion goal node
#[utoipa::path(
    post,
    path = "/api/profiles/{profile_id}/goals",
    params(("profile_id" = i32, Path, description = "Profile ID")),
    request_body = CreateGoalRequest,
    responses(
        (status = 201, description = "Goal created", body = GoalResponse),
        (status = 400, description = "Malformed deadline or request data", body = ErrorResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "goals"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn create_goal(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(profile_id): Path<i32>,
    ValidJson(request): ValidJson<CreateGoalRequest>,
) -> Result<(StatusCode, Json<ApiResponse<GoalDto>>), HandlerError> {
    let goal = goals::create_goal(&state.db, user.id, profile_id, &request, Utc::now())
        .await
        .map_err(ledger_error)?;

    info!("Created goal {} with node {:?}", goal.id, goal.node_id);
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(goal, "Goal created successfully"))))
}

#[utoipa::path(
    put,
    path = "/api/profiles/{profile_id}/goals/{goal_id}",
    params(
        ("profile_id" = i32, Path, description = "Profile ID"),
        ("goal_id" = i32, Path, description = "Goal ID")
    ),
    request_body = UpdateGoalRequest,
    responses(
        (status = 200, description = "Goal updated", body = GoalResponse),
        (status = 400, description = "Malformed deadline or request data", body = ErrorResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 404, description = "Goal not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "goals"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn update_goal(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((profile_id, goal_id)): Path<(i32, i32)>,
    ValidJson(request): ValidJson<UpdateGoalRequest>,
) -> Result<(StatusCode, Json<ApiResponse<GoalDto>>), HandlerError> {
    let goal = goals::update_goal(&state.db, user.id, profile_id, goal_id, &request, Utc::now())
        .await
        .map_err(ledger_error)?;

    info!("Updated goal {}", goal_id);
    Ok((StatusCode::OK, Json(ApiResponse::ok(goal, "Goal updated successfully"))))
}

/// Delete a goal and its contributions
///
/// The companion node stays in the graph.
#[utoipa::path(
    delete,
    path = "/api/profiles/{profile_id}/goals/{goal_id}",
    params(
        ("profile_id" = i32, Path, description = "Profile ID"),
        ("goal_id" = i32, Path, description = "Goal ID")
    ),
    responses(
        (status = 204, description = "Goal deleted"),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 404, description = "Goal not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "goals"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_goal(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((profile_id, goal_id)): Path<(i32, i32)>,
) -> Result<StatusCode, HandlerError> {
    goals::delete_goal(&state.db, user.id, profile_id, goal_id)
        .await
        .map_err(ledger_error)?;

    info!("Deleted goal {}", goal_id);
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/profiles/{profile_id}/goals/{goal_id}/transactions",
    params(
        ("profile_id" = i32, Path, description = "Profile ID"),
        ("goal_id" = i32, Path, description = "Goal ID")
    ),
    responses(
        (status = 200, description = "Goal contributions, newest first", body = GoalTransactionListResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 404, description = "Goal not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "goals"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_goal_transactions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((profile_id, goal_id)): Path<(i32, i32)>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<GoalTransactionDto>>>), HandlerError> {
    let transactions = goals::list_goal_transactions(&state.db, user.id, profile_id, goal_id)
        .await
        .map_err(ledger_error)?;

    debug!("Fetched {} transactions for goal {}", transactions.len(), goal_id);
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(transactions, "Goal transactions retrieved successfully")),
    ))
}

/// Contribute to (or, with a negative amount, withdraw from) a goal
#[utoipa::path(
    post,
    path = "/api/profiles/{profile_id}/goals/{goal_id}/transactions",
    params(
        ("profile_id" = i32, Path, description = "Profile ID"),
        ("goal_id" = i32, Path, description = "Goal ID")
    ),
    request_body = CreateGoalTransactionRequest,
    responses(
        (status = 201, description = "Contribution recorded and goal balance adjusted", body = GoalTransactionResponse),
        (status = 400, description = "Malformed date or request data", body = ErrorResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 404, description = "Goal not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "goals"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn create_goal_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((profile_id, goal_id)): Path<(i32, i32)>,
    ValidJson(request): ValidJson<CreateGoalTransactionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<GoalTransactionDto>>), HandlerError> {
    debug!("Recording {} against goal {}", request.amount, goal_id);

    let transaction =
        goals::create_goal_transaction(&state.db, user.id, profile_id, goal_id, &request, Utc::now())
            .await
            .map_err(ledger_error)?;

    info!("Created goal transaction {} for goal {}", transaction.id, goal_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(transaction, "Goal transaction created successfully")),
    ))
}

/// Remove a contribution and reverse its effect on the goal balance
#[utoipa::path(
    delete,
    path = "/api/profiles/{profile_id}/goals/{goal_id}/transactions/{tx_id}",
    params(
        ("profile_id" = i32, Path, description = "Profile ID"),
        ("goal_id" = i32, Path, description = "Goal ID"),
        ("tx_id" = i32, Path, description = "Goal transaction ID")
    ),
    responses(
        (status = 204, description = "Contribution deleted and goal balance adjusted"),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 404, description = "Goal or transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "goals"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_goal_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((profile_id, goal_id, tx_id)): Path<(i32, i32, i32)>,
) -> Result<StatusCode, HandlerError> {
    goals::delete_goal_transaction(&state.db, user.id, profile_id, goal_id, tx_id)
        .await
        .map_err(ledger_error)?;

    info!("Deleted goal transaction {} from goal {}", tx_id, goal_id);
    Ok(StatusCode::NO_CONTENT)
}

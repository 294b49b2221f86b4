use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use common::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest};
use ledger::{accounts, sessions};
use tracing::{debug, info, instrument, trace};

use crate::error::{ledger_error, HandlerError};
use crate::extract::ValidJson;
use crate::schemas::{ApiResponse, AppState, ErrorResponse, SessionResponse};

/// Register a new account with its owner profile
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResponse),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), HandlerError> {
    trace!("Entering register function");
    let now = Utc::now();

    let account = accounts::register(&state.db, &state.auth.hasher, &request, now)
        .await
        .map_err(ledger_error)?;
    let user_id = account.user.id;

    let session = state
        .auth
        .issue_session(&state.db, account, now)
        .await
        .map_err(ledger_error)?;

    info!("Registered user {}", user_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(session, "Account registered successfully")),
    ))
}

/// Exchange email and password for a session
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = SessionResponse),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), HandlerError> {
    trace!("Entering login function");

    let account = accounts::login(&state.db, &state.auth.hasher, &request.email, &request.password)
        .await
        .map_err(ledger_error)?;
    let user_id = account.user.id;

    let session = state
        .auth
        .issue_session(&state.db, account, Utc::now())
        .await
        .map_err(ledger_error)?;

    info!("User {} logged in", user_id);
    Ok((StatusCode::OK, Json(ApiResponse::ok(session, "Login successful"))))
}

/// Redeem a refresh token for a new session
///
/// The presented token is consumed; a second redemption fails.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Session renewed", body = SessionResponse),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 401, description = "Unknown, expired or already used refresh token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip(state, request))]
pub async fn refresh(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<RefreshRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), HandlerError> {
    trace!("Entering refresh function");
    let now = Utc::now();

    let rotation = sessions::rotate(&state.db, &request.refresh_token, state.auth.refresh_ttl, now)
        .await
        .map_err(ledger_error)?;
    debug!("Rotated refresh token for user {}", rotation.user_id);

    let account = accounts::load_account(&state.db, rotation.user_id)
        .await
        .map_err(ledger_error)?;
    let session = state
        .auth
        .session_response(account, rotation.refresh_token, now)
        .map_err(ledger_error)?;

    info!("Refreshed session for user {}", rotation.user_id);
    Ok((StatusCode::OK, Json(ApiResponse::ok(session, "Token refreshed successfully"))))
}

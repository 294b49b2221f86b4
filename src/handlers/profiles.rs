use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use chrono::Utc;
use common::{CreateProfileRequest, ProfileDto, UpdateProfileRequest};
use ledger::profiles;
use tracing::{debug, info, instrument};

use crate::auth::AuthUser;
use crate::error::{ledger_error, HandlerError};
use crate::extract::ValidJson;
use crate::schemas::{ApiResponse, AppState, ErrorResponse, ProfileListResponse, ProfileResponse};

/// List the caller's profiles, owner profile first
#[utoipa::path(
    get,
    path = "/api/profiles",
    responses(
        (status = 200, description = "Profiles of the caller", body = ProfileListResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "profiles"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_profiles(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<ProfileDto>>>), HandlerError> {
    let profiles = profiles::list_profiles(&state.db, user.id)
        .await
        .map_err(ledger_error)?;

    debug!("Fetched {} profiles", profiles.len());
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(profiles, "Profiles retrieved successfully")),
    ))
}

/// Create an additional (non-owner) profile
#[utoipa::path(
    post,
    path = "/api/profiles",
    request_body = CreateProfileRequest,
    responses(
        (status = 201, description = "Profile created", body = ProfileResponse),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "profiles"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn create_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidJson(request): ValidJson<CreateProfileRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProfileDto>>), HandlerError> {
    let profile = profiles::create_profile(&state.db, user.id, &request, Utc::now())
        .await
        .map_err(ledger_error)?;

    info!("Created profile {}", profile.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(profile, "Profile created successfully")),
    ))
}

#[utoipa::path(
    get,
    path = "/api/profiles/{profile_id}",
    params(("profile_id" = i32, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Profile details", body = ProfileResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "profiles"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(profile_id): Path<i32>,
) -> Result<(StatusCode, Json<ApiResponse<ProfileDto>>), HandlerError> {
    let profile = profiles::get_profile(&state.db, user.id, profile_id)
        .await
        .map_err(ledger_error)?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(profile, "Profile retrieved successfully")),
    ))
}

/// Rename or recolor a profile; empty fields keep their stored value
#[utoipa::path(
    put,
    path = "/api/profiles/{profile_id}",
    params(("profile_id" = i32, Path, description = "Profile ID")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "profiles"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(profile_id): Path<i32>,
    ValidJson(request): ValidJson<UpdateProfileRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProfileDto>>), HandlerError> {
    let profile = profiles::update_profile(&state.db, user.id, profile_id, &request)
        .await
        .map_err(ledger_error)?;

    info!("Updated profile {}", profile_id);
    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(profile, "Profile updated successfully")),
    ))
}

/// Delete a profile and everything it owns
#[utoipa::path(
    delete,
    path = "/api/profiles/{profile_id}",
    params(("profile_id" = i32, Path, description = "Profile ID")),
    responses(
        (status = 204, description = "Profile deleted"),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Foreign profile or owner profile", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "profiles"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(profile_id): Path<i32>,
) -> Result<StatusCode, HandlerError> {
    profiles::delete_profile(&state.db, user.id, profile_id)
        .await
        .map_err(ledger_error)?;

    info!("Deleted profile {}", profile_id);
    Ok(StatusCode::NO_CONTENT)
}

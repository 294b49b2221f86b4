use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use chrono::Utc;
use common::{CreateFlowRequest, FlowDto, UpdateFlowRequest};
use ledger::flows;
use tracing::{debug, info, instrument};

use crate::auth::AuthUser;
use crate::error::{ledger_error, HandlerError};
use crate::extract::ValidJson;
use crate::schemas::{ApiResponse, AppState, ErrorResponse, FlowListResponse, FlowResponse};

#[utoipa::path(
    get,
    path = "/api/profiles/{profile_id}/flows",
    params(("profile_id" = i32, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Flows of the profile", body = FlowListResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "flows"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_flows(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(profile_id): Path<i32>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<FlowDto>>>), HandlerError> {
    let flows = flows::list_flows(&state.db, user.id, profile_id)
        .await
        .map_err(ledger_error)?;

    debug!("Fetched {} flows for profile {}", flows.len(), profile_id);
    Ok((StatusCode::OK, Json(ApiResponse::ok(flows, "Flows retrieved successfully"))))
}

/// Connect two nodes of the same profile
#[utoipa::path(
    post,
    path = "/api/profiles/{profile_id}/flows",
    params(("profile_id" = i32, Path, description = "Profile ID")),
    request_body = CreateFlowRequest,
    responses(
        (status = 201, description = "Flow created", body = FlowResponse),
        (status = 400, description = "Invalid request data", body = ErrorResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 404, description = "Endpoint node not found in this profile", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "flows"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn create_flow(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(profile_id): Path<i32>,
    ValidJson(request): ValidJson<CreateFlowRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FlowDto>>), HandlerError> {
    debug!(
        "Creating flow {} -> {} in profile {}",
        request.from_node_id, request.to_node_id, profile_id
    );

    let flow = flows::create_flow(&state.db, user.id, profile_id, &request, Utc::now())
        .await
        .map_err(ledger_error)?;

    info!("Created flow {}", flow.id);
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(flow, "Flow created successfully"))))
}

#[utoipa::path(
    put,
    path = "/api/profiles/{profile_id}/flows/{flow_id}",
    params(
        ("profile_id" = i32, Path, description = "Profile ID"),
        ("flow_id" = i32, Path, description = "Flow ID")
    ),
    request_body = UpdateFlowRequest,
    responses(
        (status = 200, description = "Flow updated", body = FlowResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 404, description = "Flow not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "flows"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn update_flow(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((profile_id, flow_id)): Path<(i32, i32)>,
    ValidJson(request): ValidJson<UpdateFlowRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FlowDto>>), HandlerError> {
    let flow = flows::update_flow(&state.db, user.id, profile_id, flow_id, &request)
        .await
        .map_err(ledger_error)?;

    info!("Updated flow {}", flow_id);
    Ok((StatusCode::OK, Json(ApiResponse::ok(flow, "Flow updated successfully"))))
}

#[utoipa::path(
    delete,
    path = "/api/profiles/{profile_id}/flows/{flow_id}",
    params(
        ("profile_id" = i32, Path, description = "Profile ID"),
        ("flow_id" = i32, Path, description = "Flow ID")
    ),
    responses(
        (status = 204, description = "Flow deleted"),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 404, description = "Flow not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "flows"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_flow(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((profile_id, flow_id)): Path<(i32, i32)>,
) -> Result<StatusCode, HandlerError> {
    flows::delete_flow(&state.db, user.id, profile_id, flow_id)
        .await
        .map_err(ledger_error)?;

    info!("Deleted flow {}", flow_id);
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use chrono::Utc;
use common::{CreateNodeRequest, NodeDto, UpdateNodeRequest};
use ledger::nodes;
use tracing::{debug, info, instrument, trace};

use crate::auth::AuthUser;
use crate::error::{ledger_error, HandlerError};
use crate::extract::ValidJson;
use crate::schemas::{ApiResponse, AppState, ErrorResponse, NodeListResponse, NodeResponse};

/// List the nodes of a profile's money graph
#[utoipa::path(
    get,
    path = "/api/profiles/{profile_id}/nodes",
    params(("profile_id" = i32, Path, description = "Profile ID")),
    responses(
        (status = 200, description = "Nodes ordered by sort order", body = NodeListResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "nodes"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_nodes(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(profile_id): Path<i32>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<NodeDto>>>), HandlerError> {
    trace!("Entering list_nodes function");

    let nodes = nodes::list_nodes(&state.db, user.id, profile_id)
        .await
        .map_err(ledger_error)?;

    debug!("Fetched {} nodes for profile {}", nodes.len(), profile_id);
    Ok((StatusCode::OK, Json(ApiResponse::ok(nodes, "Nodes retrieved successfully"))))
}

/// Create a node
///
/// Goal nodes cannot be created here; they come with their goal.
#[utoipa::path(
    post,
    path = "/api/profiles/{profile_id}/nodes",
    params(("profile_id" = i32, Path, description = "Profile ID")),
    request_body = CreateNodeRequest,
    responses(
        (status = 201, description = "Node created", body = NodeResponse),
        (status = 400, description = "Invalid node type or request data", body = ErrorResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "nodes"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id, kind = %request.kind))]
pub async fn create_node(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(profile_id): Path<i32>,
    ValidJson(request): ValidJson<CreateNodeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<NodeDto>>), HandlerError> {
    trace!("Entering create_node function");

    let node = nodes::create_node(&state.db, user.id, profile_id, &request, Utc::now())
        .await
        .map_err(ledger_error)?;

    info!("Created node {} in profile {}", node.id, profile_id);
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(node, "Node created successfully"))))
}

#[utoipa::path(
    put,
    path = "/api/profiles/{profile_id}/nodes/{node_id}",
    params(
        ("profile_id" = i32, Path, description = "Profile ID"),
        ("node_id" = i32, Path, description = "Node ID")
    ),
    request_body = UpdateNodeRequest,
    responses(
        (status = 200, description = "Node updated", body = NodeResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 404, description = "Node not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "nodes"
)]
#[instrument(skip(state, user, request), fields(user_id = user.id))]
pub async fn update_node(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((profile_id, node_id)): Path<(i32, i32)>,
    ValidJson(request): ValidJson<UpdateNodeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<NodeDto>>), HandlerError> {
    let node = nodes::update_node(&state.db, user.id, profile_id, node_id, &request)
        .await
        .map_err(ledger_error)?;

    info!("Updated node {}", node_id);
    Ok((StatusCode::OK, Json(ApiResponse::ok(node, "Node updated successfully"))))
}

/// Delete a node together with every flow touching it
#[utoipa::path(
    delete,
    path = "/api/profiles/{profile_id}/nodes/{node_id}",
    params(
        ("profile_id" = i32, Path, description = "Profile ID"),
        ("node_id" = i32, Path, description = "Node ID")
    ),
    responses(
        (status = 204, description = "Node and its flows deleted"),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse),
        (status = 403, description = "Profile belongs to another user", body = ErrorResponse),
        (status = 404, description = "Node not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "nodes"
)]
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_node(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((profile_id, node_id)): Path<(i32, i32)>,
) -> Result<StatusCode, HandlerError> {
    nodes::delete_node(&state.db, user.id, profile_id, node_id)
        .await
        .map_err(ledger_error)?;

    info!("Deleted node {} from profile {}", node_id, profile_id);
    Ok(StatusCode::NO_CONTENT)
}

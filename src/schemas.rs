use std::sync::Arc;

use common::{
    AuthResponse, BudgetDto, CreateBudgetRequest, CreateFlowRequest, CreateGoalRequest,
    CreateGoalTransactionRequest, CreateNodeRequest, CreateProfileRequest,
    CreateTransactionRequest, FlowDto, GoalDto, GoalTransactionDto, LoginRequest, NodeDto,
    ProfileDto, RefreshRequest, RegisterRequest, TransactionDto, UpdateBudgetRequest,
    UpdateFlowRequest, UpdateGoalRequest, UpdateNodeRequest, UpdateProfileRequest, UserDto,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi, ToSchema,
};

use crate::auth::AuthService;
use crate::config::AppConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Credential and token services
    pub auth: Arc<AuthService>,
    pub config: Arc<AppConfig>,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
#[aliases(
    ProfileResponse = ApiResponse<ProfileDto>,
    ProfileListResponse = ApiResponse<Vec<ProfileDto>>,
    NodeResponse = ApiResponse<NodeDto>,
    NodeListResponse = ApiResponse<Vec<NodeDto>>,
    FlowResponse = ApiResponse<FlowDto>,
    FlowListResponse = ApiResponse<Vec<FlowDto>>,
    BudgetResponse = ApiResponse<BudgetDto>,
    BudgetListResponse = ApiResponse<Vec<BudgetDto>>,
    TransactionResponse = ApiResponse<TransactionDto>,
    TransactionListResponse = ApiResponse<Vec<TransactionDto>>,
    GoalResponse = ApiResponse<GoalDto>,
    GoalListResponse = ApiResponse<Vec<GoalDto>>,
    GoalTransactionResponse = ApiResponse<GoalTransactionDto>,
    GoalTransactionListResponse = ApiResponse<Vec<GoalTransactionDto>>,
    SessionResponse = ApiResponse<AuthResponse>,
)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Stable error code, e.g. `NOT_FOUND`
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::refresh,
        crate::handlers::profiles::list_profiles,
        crate::handlers::profiles::create_profile,
        crate::handlers::profiles::get_profile,
        crate::handlers::profiles::update_profile,
        crate::handlers::profiles::delete_profile,
        crate::handlers::nodes::list_nodes,
        crate::handlers::nodes::create_node,
        crate::handlers::nodes::update_node,
        crate::handlers::nodes::delete_node,
        crate::handlers::flows::list_flows,
        crate::handlers::flows::create_flow,
        crate::handlers::flows::update_flow,
        crate::handlers::flows::delete_flow,
        crate::handlers::budgets::list_budgets,
        crate::handlers::budgets::create_budget,
        crate::handlers::budgets::update_budget,
        crate::handlers::budgets::delete_budget,
        crate::handlers::budgets::list_transactions,
        crate::handlers::budgets::create_transaction,
        crate::handlers::budgets::delete_transaction,
        crate::handlers::goals::list_goals,
        crate::handlers::goals::create_goal,
        crate::handlers::goals::update_goal,
        crate::handlers::goals::delete_goal,
        crate::handlers::goals::list_goal_transactions,
        crate::handlers::goals::create_goal_transaction,
        crate::handlers::goals::delete_goal_transaction,
    ),
    components(
        schemas(
            ProfileResponse,
            ProfileListResponse,
            NodeResponse,
            NodeListResponse,
            FlowResponse,
            FlowListResponse,
            BudgetResponse,
            BudgetListResponse,
            TransactionResponse,
            TransactionListResponse,
            GoalResponse,
            GoalListResponse,
            GoalTransactionResponse,
            GoalTransactionListResponse,
            SessionResponse,
            ErrorResponse,
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            RefreshRequest,
            AuthResponse,
            UserDto,
            ProfileDto,
            CreateProfileRequest,
            UpdateProfileRequest,
            NodeDto,
            CreateNodeRequest,
            UpdateNodeRequest,
            FlowDto,
            CreateFlowRequest,
            UpdateFlowRequest,
            BudgetDto,
            CreateBudgetRequest,
            UpdateBudgetRequest,
            TransactionDto,
            CreateTransactionRequest,
            GoalDto,
            CreateGoalRequest,
            UpdateGoalRequest,
            GoalTransactionDto,
            CreateGoalTransactionRequest,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration, login and token refresh"),
        (name = "profiles", description = "Household profiles"),
        (name = "nodes", description = "Money-graph nodes"),
        (name = "flows", description = "Money-graph flows"),
        (name = "budgets", description = "Budgets and their transactions"),
        (name = "goals", description = "Savings goals and their contributions"),
    ),
    info(
        title = "Vault-X API",
        description = "Budgeting backend - profiles, money graph, budgets and savings goals",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;

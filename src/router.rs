use crate::auth::{require_auth, require_profile_access};
use crate::handlers::{
    auth::{login, refresh, register},
    budgets::{create_budget, create_transaction, delete_budget, delete_transaction, list_budgets, list_transactions, update_budget},
    flows::{create_flow, delete_flow, list_flows, update_flow},
    goals::{
        create_goal, create_goal_transaction, delete_goal, delete_goal_transaction, list_goal_transactions,
        list_goals, update_goal,
    },
    health::health_check,
    nodes::{create_node, delete_node, list_nodes, update_node},
    profiles::{create_profile, delete_profile, get_profile, list_profiles, update_profile},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, ORIGIN},
        HeaderValue, Method,
    },
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        // Profile routes
        .route("/api/profiles", get(list_profiles).post(create_profile))
        .route(
            "/api/profiles/:profile_id",
            get(get_profile).put(update_profile).delete(delete_profile),
        )
        // Money graph
        .route("/api/profiles/:profile_id/nodes", get(list_nodes).post(create_node))
        .route("/api/profiles/:profile_id/nodes/:node_id", put(update_node).delete(delete_node))
        .route("/api/profiles/:profile_id/flows", get(list_flows).post(create_flow))
        .route("/api/profiles/:profile_id/flows/:flow_id", put(update_flow).delete(delete_flow))
        // Budgets and their transactions
        .route("/api/profiles/:profile_id/budgets", get(list_budgets).post(create_budget))
        .route(
            "/api/profiles/:profile_id/budgets/:budget_id",
            put(update_budget).delete(delete_budget),
        )
        .route(
            "/api/profiles/:profile_id/budgets/:budget_id/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route(
            "/api/profiles/:profile_id/budgets/:budget_id/transactions/:tx_id",
            delete(delete_transaction),
        )
        // Goals and their transactions
        .route("/api/profiles/:profile_id/goals", get(list_goals).post(create_goal))
        .route(
            "/api/profiles/:profile_id/goals/:goal_id",
            put(update_goal).delete(delete_goal),
        )
        .route(
            "/api/profiles/:profile_id/goals/:goal_id/transactions",
            get(list_goal_transactions).post(create_goal_transaction),
        )
        .route(
            "/api/profiles/:profile_id/goals/:goal_id/transactions/:tx_id",
            delete(delete_goal_transaction),
        )
        // Layers run bottom-up: identity first, then profile ownership
        .route_layer(middleware::from_fn_with_state(state.clone(), require_profile_access))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let cors = cors_layer(&state.config.allowed_origins());
    let timeout = state.config.request_timeout();

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Authentication
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .merge(protected)
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(timeout))
                .layer(cors),
        )
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([ORIGIN, CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}

use crate::config::{build_app_state, AppConfig};
use crate::router::create_router;
use crate::schemas::AppState;
use axum::http::StatusCode;
use axum::Router;
use axum_test::TestServer;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use serde_json::{json, Value};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Create an in-memory SQLite database for testing
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Configuration with cheap password hashing so tests stay fast.
pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        bind_address: "127.0.0.1:0".to_string(),
        max_connections: 1,
        jwt_secret: "test-secret".to_string(),
        access_token_ttl_secs: 900,
        refresh_token_ttl_secs: 3600,
        argon2_memory_kib: 1024,
        argon2_iterations: 1,
        allowed_origins: "http://localhost:5173".to_string(),
        request_timeout_secs: 30,
    }
}

pub async fn setup_test_app_state() -> AppState {
    let db = setup_test_db().await;
    build_app_state(db, &test_config()).expect("Failed to build test state")
}

/// Initialize tracing for tests with output to STDERR.
///
/// The log level comes from RUST_LOG, defaulting to WARN.
fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| match level.to_uppercase().as_str() {
            "ERROR" => Some(Level::ERROR),
            "WARN" => Some(Level::WARN),
            "INFO" => Some(Level::INFO),
            "DEBUG" => Some(Level::DEBUG),
            "TRACE" => Some(Level::TRACE),
            _ => None,
        })
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// Create axum app for testing
pub async fn setup_test_app() -> Router {
    let _guard = init_test_tracing();

    let state = setup_test_app_state().await;
    create_router(state)
}

pub async fn setup_test_server() -> TestServer {
    TestServer::new(setup_test_app().await).expect("Failed to start test server")
}

/// A registered user as seen by the tests.
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub profile_id: i64,
}

impl Session {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// Registers `email` and returns its tokens and owner profile.
pub async fn register(server: &TestServer, email: &str) -> Session {
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "email": email,
            "password": "correct-horse",
            "name": "Owner"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    let data = &body["data"];
    Session {
        access_token: data["access_token"].as_str().expect("access token").to_string(),
        refresh_token: data["refresh_token"].as_str().expect("refresh token").to_string(),
        profile_id: data["profiles"][0]["id"].as_i64().expect("owner profile id"),
    }
}

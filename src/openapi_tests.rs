use crate::schemas::ApiDoc;
use utoipa::openapi::{schema::Schema, RefOr};
use utoipa::OpenApi;

fn object_properties(name: &str) -> Vec<String> {
    let openapi = ApiDoc::openapi();
    let components = openapi.components.expect("components");
    match components.schemas.get(name) {
        Some(RefOr::T(Schema::Object(obj))) => obj.properties.keys().cloned().collect(),
        _ => panic!("{name} should be an object schema"),
    }
}

#[test]
fn test_openapi_schema_generation() {
    let openapi = ApiDoc::openapi();

    let components = openapi.components.as_ref().unwrap();
    assert!(components.schemas.contains_key("ErrorResponse"));
    assert!(components.schemas.contains_key("HealthResponse"));
    assert!(components.schemas.contains_key("GoalDto"));
    assert!(components.security_schemes.contains_key("bearer_auth"));

    assert!(serde_json::to_string(&openapi).is_ok());
}

#[test]
fn test_error_response_schema_structure() {
    let properties = object_properties("ErrorResponse");
    for field in ["error", "code", "success"] {
        assert!(properties.iter().any(|p| p == field), "missing {field}");
    }
}

#[test]
fn test_node_schema_uses_type_field() {
    let properties = object_properties("NodeDto");
    assert!(properties.iter().any(|p| p == "type"));
    assert!(!properties.iter().any(|p| p == "kind"));
}

#[test]
fn test_all_routes_are_documented() {
    let openapi = ApiDoc::openapi();
    let paths = &openapi.paths.paths;

    for path in [
        "/health",
        "/api/auth/register",
        "/api/auth/login",
        "/api/auth/refresh",
        "/api/profiles",
        "/api/profiles/{profile_id}",
        "/api/profiles/{profile_id}/nodes",
        "/api/profiles/{profile_id}/nodes/{node_id}",
        "/api/profiles/{profile_id}/flows",
        "/api/profiles/{profile_id}/flows/{flow_id}",
        "/api/profiles/{profile_id}/budgets",
        "/api/profiles/{profile_id}/budgets/{budget_id}",
        "/api/profiles/{profile_id}/budgets/{budget_id}/transactions",
        "/api/profiles/{profile_id}/budgets/{budget_id}/transactions/{tx_id}",
        "/api/profiles/{profile_id}/goals",
        "/api/profiles/{profile_id}/goals/{goal_id}",
        "/api/profiles/{profile_id}/goals/{goal_id}/transactions",
        "/api/profiles/{profile_id}/goals/{goal_id}/transactions/{tx_id}",
    ] {
        assert!(paths.contains_key(path), "undocumented path {path}");
    }
}

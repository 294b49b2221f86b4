use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ProfileDto {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub avatar_color: String,
    pub is_owner: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct CreateProfileRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    /// Defaults to `#10b981`
    pub avatar_color: Option<String>,
}

/// Empty or missing fields keep their stored value.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq, Default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub avatar_color: Option<String>,
}

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Savings goal with its derived progress figures.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GoalDto {
    pub id: i32,
    pub profile_id: i32,
    /// Companion `goal` node; null once that node is deleted
    pub node_id: Option<i32>,
    pub name: String,
    pub target: Decimal,
    pub current: Decimal,
    pub deadline: Option<NaiveDate>,
    pub priority: i32,
    pub color: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub percentage: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub days_remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub monthly_needed: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct CreateGoalRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub target: Decimal,
    #[serde(default)]
    pub current: Decimal,
    /// `YYYY-MM-DD`; empty means no deadline
    pub deadline: Option<String>,
    #[serde(default)]
    pub priority: i32,
    pub color: Option<String>,
}

/// Every field is overwritten except color, which is kept when absent.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct UpdateGoalRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub target: Decimal,
    #[serde(default)]
    pub current: Decimal,
    pub deadline: Option<String>,
    #[serde(default)]
    pub priority: i32,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct GoalTransactionDto {
    pub id: i32,
    pub goal_id: i32,
    pub amount: Decimal,
    pub note: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct CreateGoalTransactionRequest {
    pub amount: Decimal,
    pub note: Option<String>,
    pub date: Option<String>,
}

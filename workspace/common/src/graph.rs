//! Cash-flow graph payloads: nodes and the flows between them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct NodeDto {
    pub id: i32,
    pub profile_id: i32,
    /// One of income, account, savings, investment, expense, budget, goal
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    pub institution: Option<String>,
    pub amount: Decimal,
    pub balance: Decimal,
    pub apy: Decimal,
    pub budgeted: Decimal,
    pub goal: Decimal,
    /// Opaque client-owned JSON text
    pub metadata: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating a node. `goal` nodes are only created through goals.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct CreateNodeRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[validate(length(min = 1, message = "label is required"))]
    pub label: String,
    pub institution: Option<String>,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub balance: Decimal,
    #[serde(default)]
    pub apy: Decimal,
    #[serde(default)]
    pub budgeted: Decimal,
    #[serde(default)]
    pub goal: Decimal,
    pub metadata: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

/// Label and metadata keep their value when empty; numerics and
/// institution are always overwritten.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq, Default)]
pub struct UpdateNodeRequest {
    pub label: Option<String>,
    pub institution: Option<String>,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub balance: Decimal,
    #[serde(default)]
    pub apy: Decimal,
    #[serde(default)]
    pub budgeted: Decimal,
    #[serde(default)]
    pub goal: Decimal,
    pub metadata: Option<String>,
    /// Kept when absent
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct FlowDto {
    pub id: i32,
    pub profile_id: i32,
    pub from_node_id: i32,
    pub to_node_id: i32,
    pub amount: Decimal,
    pub label: Option<String>,
    pub is_recurring: bool,
    pub created_at: DateTime<Utc>,
}

fn recurring_default() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct CreateFlowRequest {
    pub from_node_id: i32,
    pub to_node_id: i32,
    pub amount: Decimal,
    pub label: Option<String>,
    #[serde(default = "recurring_default")]
    pub is_recurring: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct UpdateFlowRequest {
    pub amount: Decimal,
    pub label: Option<String>,
    #[serde(default = "recurring_default")]
    pub is_recurring: bool,
}

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Budget with its spend for the current calendar month.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct BudgetDto {
    pub id: i32,
    pub profile_id: i32,
    pub node_id: Option<i32>,
    pub name: String,
    pub budgeted: Decimal,
    pub period: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub spent: Decimal,
    pub remaining: Decimal,
    /// Omitted when `budgeted` is zero or negative
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub percentage: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct CreateBudgetRequest {
    pub node_id: Option<i32>,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub budgeted: Decimal,
    /// weekly, monthly or yearly; defaults to monthly
    pub period: Option<String>,
    pub color: Option<String>,
}

/// Name and amount are overwritten; period and color keep their value when absent.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct UpdateBudgetRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub budgeted: Decimal,
    pub period: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TransactionDto {
    pub id: i32,
    pub budget_id: i32,
    pub amount: Decimal,
    pub note: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate, PartialEq)]
pub struct CreateTransactionRequest {
    pub amount: Decimal,
    pub note: Option<String>,
    /// `YYYY-MM-DD`; today when empty or absent
    pub date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_percentage_omitted_when_absent() {
        let dto = BudgetDto {
            id: 1,
            profile_id: 1,
            node_id: None,
            name: "Groceries".to_string(),
            budgeted: Decimal::ZERO,
            period: "monthly".to_string(),
            color: "#10b981".to_string(),
            created_at: Utc::now(),
            spent: Decimal::new(12, 0),
            remaining: Decimal::new(-12, 0),
            percentage: None,
        };

        let value = serde_json::to_value(&dto).unwrap();
        assert!(value.get("percentage").is_none());
        assert_eq!(value["remaining"], "-12");
    }

    #[test]
    fn test_transaction_request_optional_fields() {
        let request: CreateTransactionRequest =
            serde_json::from_value(json!({ "amount": 42.1 })).unwrap();

        assert_eq!(request.amount, Decimal::new(421, 1));
        assert!(request.note.is_none());
        assert!(request.date.is_none());
    }
}

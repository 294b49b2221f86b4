//! Derived financial figures for budgets and goals.
//!
//! Everything here is pure: callers pass ledger rows and the reference
//! date or instant, nothing touches the database.

pub mod budget;
pub mod error;
pub mod goal;
pub mod period;

pub use budget::{budget_metrics, BudgetMetrics, SpendTracker};
pub use error::{ComputeError, Result};
pub use goal::{days_until, goal_metrics, GoalMetrics};
pub use period::PeriodWindow;

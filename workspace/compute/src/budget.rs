//! Budget spend aggregation.
//!
//! Spend is the sum of a budget's ledger entries dated inside the current
//! [`PeriodWindow`]. `remaining` and `percentage` are derived from it and the
//! budgeted amount; none of these values are ever persisted.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{error, trace};

use crate::error::{ComputeError, Result};
use crate::period::PeriodWindow;

/// Derived spend figures for a single budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetMetrics {
    pub spent: Decimal,
    pub remaining: Decimal,
    /// `None` when the budgeted amount is zero or negative.
    pub percentage: Option<Decimal>,
}

/// Accumulates ledger entries per budget for one window.
#[derive(Debug, Clone)]
pub struct SpendTracker {
    window: PeriodWindow,
    totals: HashMap<i32, Decimal>,
}

impl SpendTracker {
    pub fn new(window: PeriodWindow) -> Self {
        Self {
            window,
            totals: HashMap::new(),
        }
    }

    pub fn window(&self) -> PeriodWindow {
        self.window
    }

    /// Adds an entry; entries dated outside the window are ignored.
    pub fn record(&mut self, budget_id: i32, amount: Decimal, date: NaiveDate) -> Result<()> {
        if !self.window.contains(date) {
            trace!(budget_id, %date, "Skipping entry outside window");
            return Ok(());
        }

        let total = self.totals.entry(budget_id).or_insert(Decimal::ZERO);
        *total = total.checked_add(amount).ok_or_else(|| {
            let err = ComputeError::Decimal(format!("Spend overflow for budget {}", budget_id));
            error!(?err, "Failed to accumulate spend");
            err
        })?;

        Ok(())
    }

    pub fn spent(&self, budget_id: i32) -> Decimal {
        self.totals.get(&budget_id).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn metrics(&self, budget_id: i32, budgeted: Decimal) -> Result<BudgetMetrics> {
        budget_metrics(budgeted, self.spent(budget_id))
    }
}

/// Computes remaining and percentage from a budgeted amount and its spend.
pub fn budget_metrics(budgeted: Decimal, spent: Decimal) -> Result<BudgetMetrics> {
    let remaining = budgeted.checked_sub(spent).ok_or_else(|| {
        ComputeError::Decimal(format!("Overflow computing {} - {}", budgeted, spent))
    })?;

    let percentage = if budgeted > Decimal::ZERO {
        let ratio = spent
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.checked_div(budgeted))
            .ok_or_else(|| {
                ComputeError::Decimal(format!("Overflow computing percentage of {}", budgeted))
            })?;
        Some(ratio.round_dp(4).normalize())
    } else {
        None
    };

    Ok(BudgetMetrics {
        spent: spent.normalize(),
        remaining: remaining.normalize(),
        percentage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn march() -> PeriodWindow {
        PeriodWindow::current_month(NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()).unwrap()
    }

    #[test]
    fn test_spend_only_counts_current_window() {
        let mut tracker = SpendTracker::new(march());
        tracker
            .record(1, dec!(50), NaiveDate::from_ymd_opt(2025, 3, 2).unwrap())
            .unwrap();
        tracker
            .record(1, dec!(30), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap())
            .unwrap();

        let metrics = tracker.metrics(1, dec!(200)).unwrap();
        assert_eq!(metrics.spent, dec!(50));
        assert_eq!(metrics.remaining, dec!(150));
        assert_eq!(metrics.percentage, Some(dec!(25)));
    }

    #[test]
    fn test_budget_without_entries_reports_zero() {
        let tracker = SpendTracker::new(march());

        let metrics = tracker.metrics(7, dec!(120)).unwrap();
        assert_eq!(metrics.spent, Decimal::ZERO);
        assert_eq!(metrics.remaining, dec!(120));
        assert_eq!(metrics.percentage, Some(Decimal::ZERO));
    }

    #[test]
    fn test_non_positive_budget_has_no_percentage() {
        assert_eq!(budget_metrics(dec!(0), dec!(10)).unwrap().percentage, None);
        assert_eq!(budget_metrics(dec!(-5), dec!(10)).unwrap().percentage, None);
        assert_eq!(budget_metrics(dec!(0), dec!(10)).unwrap().remaining, dec!(-10));
    }

    #[test]
    fn test_overspend_exceeds_hundred_percent() {
        let metrics = budget_metrics(dec!(80), dec!(100)).unwrap();
        assert_eq!(metrics.remaining, dec!(-20));
        assert_eq!(metrics.percentage, Some(dec!(125)));
    }

    #[test]
    fn test_separate_budgets_accumulate_independently() {
        let mut tracker = SpendTracker::new(march());
        let day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        tracker.record(1, dec!(10.25), day).unwrap();
        tracker.record(2, dec!(4), day).unwrap();
        tracker.record(1, dec!(0.75), day).unwrap();

        assert_eq!(tracker.spent(1), dec!(11.00));
        assert_eq!(tracker.spent(2), dec!(4));
        assert_eq!(tracker.spent(3), Decimal::ZERO);
    }
}

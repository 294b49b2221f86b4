//! Calendar windows used to scope ledger sums.

use chrono::{Datelike, Months, NaiveDate};
use tracing::error;

use crate::error::{ComputeError, Result};

/// Half-open date window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodWindow {
    /// Window covering the calendar month that contains `today`.
    ///
    /// Every budget is summed over this window regardless of its own period.
    pub fn current_month(today: NaiveDate) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).ok_or_else(|| {
            let err = ComputeError::Date(format!("Invalid month start for {}", today));
            error!(?err, "Failed to compute month window");
            err
        })?;
        let end = start.checked_add_months(Months::new(1)).ok_or_else(|| {
            let err = ComputeError::Date(format!("Month after {} is out of range", start));
            error!(?err, "Failed to compute month window");
            err
        })?;

        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_month_mid_month() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 17).unwrap();
        let window = PeriodWindow::current_month(today).unwrap();

        assert_eq!(window.start, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(window.end, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
    }

    #[test]
    fn test_current_month_december_rolls_year() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let window = PeriodWindow::current_month(today).unwrap();

        assert_eq!(window.start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(window.end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn test_contains_is_half_open() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        let window = PeriodWindow::current_month(today).unwrap();

        assert!(window.contains(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
        assert!(window.contains(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));
    }
}

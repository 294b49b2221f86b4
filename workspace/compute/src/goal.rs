//! Goal progress figures: percentage, days remaining and monthly contribution.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::error::{ComputeError, Result};

const SECONDS_PER_DAY: i64 = 86_400;
const DAYS_PER_MONTH: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GoalMetrics {
    pub percentage: Option<Decimal>,
    pub days_remaining: Option<i64>,
    pub monthly_needed: Option<Decimal>,
}

/// Whole days from `now` until midnight UTC of `deadline`, floored.
/// Past deadlines produce negative values.
pub fn days_until(deadline: NaiveDate, now: DateTime<Utc>) -> i64 {
    let deadline_start = deadline.and_time(NaiveTime::MIN).and_utc();
    (deadline_start - now)
        .num_seconds()
        .div_euclid(SECONDS_PER_DAY)
}

pub fn goal_metrics(
    target: Decimal,
    current: Decimal,
    deadline: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> Result<GoalMetrics> {
    let percentage = if target > Decimal::ZERO {
        let ratio = current
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.checked_div(target))
            .ok_or_else(|| {
                ComputeError::Decimal(format!("Overflow computing progress of {}", target))
            })?;
        Some(ratio.round_dp(4).normalize())
    } else {
        None
    };

    let days_remaining = deadline.map(|deadline| days_until(deadline, now));

    // (target - current) / (days / 30)
    let monthly_needed = match days_remaining {
        Some(days) if days > 0 => {
            let needed = target
                .checked_sub(current)
                .and_then(|outstanding| outstanding.checked_mul(Decimal::from(DAYS_PER_MONTH)))
                .and_then(|scaled| scaled.checked_div(Decimal::from(days)))
                .ok_or_else(|| {
                    ComputeError::Decimal(format!(
                        "Overflow computing monthly contribution for {} days",
                        days
                    ))
                })?;
            Some(needed.round_dp(4).normalize())
        }
        _ => None,
    };

    Ok(GoalMetrics {
        percentage,
        days_remaining,
        monthly_needed,
    })
}

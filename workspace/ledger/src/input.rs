//! Normalization of loosely-typed request fields.

use chrono::NaiveDate;

use crate::error::{LedgerError, Result};

/// `None` for absent, empty or whitespace-only strings.
pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Ledger entry date; falls back to `today` when absent or empty.
pub(crate) fn entry_date(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    Ok(optional_date(raw)?.unwrap_or(today))
}

/// Parses an optional `YYYY-MM-DD` date; empty means no date.
pub(crate) fn optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    match non_empty(raw) {
        None => Ok(None),
        Some(value) => NaiveDate::parse_from_str(&value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| LedgerError::InvalidInput(format!("invalid date '{}', expected YYYY-MM-DD", value))),
    }
}

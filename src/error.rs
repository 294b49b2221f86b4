//! Translation of ledger failures into HTTP error envelopes.

use axum::{http::StatusCode, Json};
use ledger::LedgerError;
use tracing::{debug, error};

use crate::schemas::ErrorResponse;

pub type HandlerError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            code: code.to_string(),
            success: false,
        }),
    )
}

/// Maps a ledger error to its status and stable code.
///
/// Store and internal failures are logged in full and answered with a
/// generic message.
pub fn ledger_error(err: LedgerError) -> HandlerError {
    match err {
        LedgerError::InvalidInput(message) => {
            debug!("Rejected input: {}", message);
            error_response(StatusCode::BAD_REQUEST, "INVALID_INPUT", message)
        }
        LedgerError::Unauthorized(message) => {
            debug!("Unauthorized: {}", message);
            error_response(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
        }
        LedgerError::Forbidden(message) => {
            debug!("Forbidden: {}", message);
            error_response(StatusCode::FORBIDDEN, "FORBIDDEN", message)
        }
        LedgerError::NotFound(message) => error_response(StatusCode::NOT_FOUND, "NOT_FOUND", message),
        LedgerError::Conflict(message) => error_response(StatusCode::CONFLICT, "CONFLICT", message),
        LedgerError::Database(e) => {
            error!("Database error: {}", e);
            internal_error()
        }
        LedgerError::Compute(e) => {
            error!("Calculation error: {}", e);
            internal_error()
        }
        LedgerError::Internal(message) => {
            error!("Internal error: {}", message);
            internal_error()
        }
    }
}

fn internal_error() -> HandlerError {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "internal server error",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DbErr;

    #[test]
    fn test_status_and_code_mapping() {
        let cases = [
            (LedgerError::InvalidInput("bad".into()), StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            (LedgerError::Unauthorized("no".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (LedgerError::Forbidden("access denied".into()), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (LedgerError::NotFound("node not found".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (LedgerError::Conflict("taken".into()), StatusCode::CONFLICT, "CONFLICT"),
        ];

        for (err, status, code) in cases {
            let (actual_status, Json(body)) = ledger_error(err);
            assert_eq!(actual_status, status);
            assert_eq!(body.code, code);
            assert!(!body.success);
        }
    }

    #[test]
    fn test_database_detail_is_not_exposed() {
        let (status, Json(body)) = ledger_error(LedgerError::Database(DbErr::Custom(
            "no such table: secrets".to_string(),
        )));

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, "INTERNAL_ERROR");
        assert!(!body.error.contains("secrets"));
    }
}

use compute::ComputeError;
use sea_orm::DbErr;
use thiserror::Error;

/// Error types for ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Request data failed a domain rule
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Missing or invalid credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller does not own the addressed profile, or the action is never allowed
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource is absent or not reachable through the authorized profile
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Error from derived metric computation
    #[error("Compute error: {0}")]
    Compute(#[from] ComputeError),

    /// Runtime error for unexpected situations
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Type alias for Result with LedgerError
pub type Result<T> = std::result::Result<T, LedgerError>;

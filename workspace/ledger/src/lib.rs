//! Budget and goal ledger engine.
//!
//! Each operation takes the store handle explicitly, authorizes the caller
//! against the addressed profile, and runs multi-table writes inside one
//! store transaction. Derived figures come from the `compute` crate and are
//! only ever part of responses.

pub mod accounts;
pub mod budgets;
pub mod error;
pub mod flows;
pub mod gate;
pub mod goals;
mod input;
pub mod nodes;
pub mod profiles;
pub mod sessions;

#[cfg(test)]
pub(crate) mod testing;

pub use accounts::{Account, PasswordHasher};
pub use error::{LedgerError, Result};

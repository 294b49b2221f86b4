pub mod auth;
pub mod budgets;
pub mod flows;
pub mod goals;
pub mod health;
pub mod nodes;
pub mod profiles;

//! Root of the SeaORM entity modules.
//! Every domain table of the budgeting backend is described here; the
//! schema itself is created by the `migration` crate.

pub mod budget;
pub mod flow;
pub mod goal;
pub mod goal_transaction;
pub mod node;
pub mod profile;
pub mod refresh_token;
pub mod transaction;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::budget::Entity as Budget;
    pub use super::flow::Entity as Flow;
    pub use super::goal::Entity as Goal;
    pub use super::goal_transaction::Entity as GoalTransaction;
    pub use super::node::Entity as Node;
    pub use super::profile::Entity as Profile;
    pub use super::refresh_token::Entity as RefreshToken;
    pub use super::transaction::Entity as Transaction;
    pub use super::user::Entity as User;
}

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// Default color for new goals.
pub const DEFAULT_GOAL_COLOR: &str = "#a855f7";

/// A savings target.
///
/// `current` is a running total maintained incrementally by the goal
/// transaction ledger. `node_id` points at the companion `goal` node and is
/// nulled, not cascaded, when that node is deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub profile_id: i32,
    pub node_id: Option<i32>,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub target: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub current: Decimal,
    pub deadline: Option<NaiveDate>,
    pub priority: i32,
    pub color: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::ProfileId",
        to = "super::profile::Column::Id",
        on_delete = "Cascade"
    )]
    Profile,
    #[sea_orm(
        belongs_to = "super::node::Entity",
        from = "Column::NodeId",
        to = "super::node::Column::Id",
        on_delete = "SetNull"
    )]
    Node,
    #[sea_orm(has_many = "super::goal_transaction::Entity")]
    GoalTransaction,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::node::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Node.def()
    }
}

impl Related<super::goal_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GoalTransaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

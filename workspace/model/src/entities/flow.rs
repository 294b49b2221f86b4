use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// A directed money movement between two nodes of the same profile.
/// Cycles and self-loops are allowed; the graph is for display and aggregation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "flows")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub profile_id: i32,
    pub from_node_id: i32,
    pub to_node_id: i32,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub amount: Decimal,
    pub label: Option<String>,
    #[sea_orm(default_value = "true")]
    pub is_recurring: bool,
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
        from = "Column::FromNodeId",
        to = "super::node::Column::Id",
        on_delete = "Cascade"
    )]
    FromNode,
    #[sea_orm(
        belongs_to = "super::node::Entity",
        from = "Column::ToNodeId",
        to = "super::node::Column::Id",
        on_delete = "Cascade"
    )]
    ToNode,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

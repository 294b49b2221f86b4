use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use std::fmt;
use std::str::FromStr;

/// The kind of a cash-flow graph vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum NodeKind {
    #[sea_orm(string_value = "income")]
    Income,
    #[sea_orm(string_value = "account")]
    Account,
    #[sea_orm(string_value = "savings")]
    Savings,
    #[sea_orm(string_value = "investment")]
    Investment,
    #[sea_orm(string_value = "expense")]
    Expense,
    #[sea_orm(string_value = "budget")]
    Budget,
    /// Only ever created as the companion node of a goal.
    #[sea_orm(string_value = "goal")]
    Goal,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Income => "income",
            NodeKind::Account => "account",
            NodeKind::Savings => "savings",
            NodeKind::Investment => "investment",
            NodeKind::Expense => "expense",
            NodeKind::Budget => "budget",
            NodeKind::Goal => "goal",
        }
    }

    /// Whether clients may create a node of this kind directly.
    pub fn is_client_creatable(&self) -> bool {
        !matches!(self, NodeKind::Goal)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(NodeKind::Income),
            "account" => Ok(NodeKind::Account),
            "savings" => Ok(NodeKind::Savings),
            "investment" => Ok(NodeKind::Investment),
            "expense" => Ok(NodeKind::Expense),
            "budget" => Ok(NodeKind::Budget),
            "goal" => Ok(NodeKind::Goal),
            other => Err(format!("unknown node type '{}'", other)),
        }
    }
}

/// A vertex in a profile's cash-flow graph.
///
/// The numeric fields are a union over all node kinds: `balance` and `apy`
/// matter for savings, `budgeted` for expense categories, `goal` for target
/// balances. `metadata` is client-defined JSON kept as opaque text.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "nodes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub profile_id: i32,
    pub kind: NodeKind,
    pub label: String,
    pub institution: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub apy: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub budgeted: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub goal: Decimal,
    pub metadata: String,
    pub sort_order: i32,
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
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Email).unique_key())
                    .col(string(Users::PasswordHash))
                    .col(timestamp_with_time_zone(Users::CreatedAt))
                    .col(timestamp_with_time_zone(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // Create profiles table
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(pk_auto(Profiles::Id))
                    .col(integer(Profiles::UserId))
                    .col(string(Profiles::Name))
                    .col(string(Profiles::AvatarColor).default("#10b981"))
                    .col(boolean(Profiles::IsOwner).default(false))
                    .col(timestamp_with_time_zone(Profiles::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profiles_user")
                            .from(Profiles::Table, Profiles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create nodes table (cash-flow graph vertices)
        manager
            .create_table(
                Table::create()
                    .table(Nodes::Table)
                    .if_not_exists()
                    .col(pk_auto(Nodes::Id))
                    .col(integer(Nodes::ProfileId))
                    .col(string_len(Nodes::Kind, 20))
                    .col(string(Nodes::Label))
                    .col(string_null(Nodes::Institution))
                    .col(decimal(Nodes::Amount).decimal_len(16, 4).default(0))
                    .col(decimal(Nodes::Balance).decimal_len(16, 4).default(0))
                    .col(decimal(Nodes::Apy).decimal_len(16, 4).default(0))
                    .col(decimal(Nodes::Budgeted).decimal_len(16, 4).default(0))
                    .col(decimal(Nodes::Goal).decimal_len(16, 4).default(0))
                    .col(text(Nodes::Metadata).default("{}"))
                    .col(integer(Nodes::SortOrder).default(0))
                    .col(timestamp_with_time_zone(Nodes::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_nodes_profile")
                            .from(Nodes::Table, Nodes::ProfileId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create flows table (cash-flow graph edges)
        manager
            .create_table(
                Table::create()
                    .table(Flows::Table)
                    .if_not_exists()
                    .col(pk_auto(Flows::Id))
                    .col(integer(Flows::ProfileId))
                    .col(integer(Flows::FromNodeId))
                    .col(integer(Flows::ToNodeId))
                    .col(decimal(Flows::Amount).decimal_len(16, 4))
                    .col(string_null(Flows::Label))
                    .col(boolean(Flows::IsRecurring).default(true))
                    .col(timestamp_with_time_zone(Flows::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_flows_profile")
                            .from(Flows::Table, Flows::ProfileId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_flows_from_node")
                            .from(Flows::Table, Flows::FromNodeId)
                            .to(Nodes::Table, Nodes::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_flows_to_node")
                            .from(Flows::Table, Flows::ToNodeId)
                            .to(Nodes::Table, Nodes::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create budgets table
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(pk_auto(Budgets::Id))
                    .col(integer(Budgets::ProfileId))
                    .col(integer_null(Budgets::NodeId))
                    .col(string(Budgets::Name))
                    .col(decimal(Budgets::Budgeted).decimal_len(16, 4))
                    .col(string_len(Budgets::Period, 10).default("monthly"))
                    .col(string(Budgets::Color).default("#10b981"))
                    .col(timestamp_with_time_zone(Budgets::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_budgets_profile")
                            .from(Budgets::Table, Budgets::ProfileId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_budgets_node")
                            .from(Budgets::Table, Budgets::NodeId)
                            .to(Nodes::Table, Nodes::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create transactions table (budget ledger)
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(pk_auto(Transactions::Id))
                    .col(integer(Transactions::BudgetId))
                    .col(decimal(Transactions::Amount).decimal_len(16, 4))
                    .col(string_null(Transactions::Note))
                    .col(date(Transactions::Date))
                    .col(timestamp_with_time_zone(Transactions::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_budget")
                            .from(Transactions::Table, Transactions::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create goals table
        manager
            .create_table(
                Table::create()
                    .table(Goals::Table)
                    .if_not_exists()
                    .col(pk_auto(Goals::Id))
                    .col(integer(Goals::ProfileId))
                    .col(integer_null(Goals::NodeId))
                    .col(string(Goals::Name))
                    .col(decimal(Goals::Target).decimal_len(16, 4))
                    .col(decimal(Goals::Current).decimal_len(16, 4).default(0))
                    .col(date_null(Goals::Deadline))
                    .col(integer(Goals::Priority).default(0))
                    .col(string(Goals::Color).default("#a855f7"))
                    .col(timestamp_with_time_zone(Goals::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_goals_profile")
                            .from(Goals::Table, Goals::ProfileId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_goals_node")
                            .from(Goals::Table, Goals::NodeId)
                            .to(Nodes::Table, Nodes::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create goal_transactions table (goal ledger)
        manager
            .create_table(
                Table::create()
                    .table(GoalTransactions::Table)
                    .if_not_exists()
                    .col(pk_auto(GoalTransactions::Id))
                    .col(integer(GoalTransactions::GoalId))
                    .col(decimal(GoalTransactions::Amount).decimal_len(16, 4))
                    .col(string_null(GoalTransactions::Note))
                    .col(date(GoalTransactions::Date))
                    .col(timestamp_with_time_zone(GoalTransactions::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_goal_transactions_goal")
                            .from(GoalTransactions::Table, GoalTransactions::GoalId)
                            .to(Goals::Table, Goals::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Indexes for the profile-scoped and ledger lookups
        let indexes = [
            index("idx_profiles_user", Profiles::Table, Profiles::UserId),
            index("idx_nodes_profile", Nodes::Table, Nodes::ProfileId),
            index("idx_flows_profile", Flows::Table, Flows::ProfileId),
            index("idx_budgets_profile", Budgets::Table, Budgets::ProfileId),
            index("idx_transactions_budget", Transactions::Table, Transactions::BudgetId),
            index("idx_transactions_date", Transactions::Table, Transactions::Date),
            index("idx_goals_profile", Goals::Table, Goals::ProfileId),
            index("idx_goal_transactions_goal", GoalTransactions::Table, GoalTransactions::GoalId),
            index("idx_goal_transactions_date", GoalTransactions::Table, GoalTransactions::Date),
        ];
        for statement in indexes {
            manager.create_index(statement).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(GoalTransactions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Goals::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Flows::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Nodes::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

fn index<T, C>(name: &str, table: T, column: C) -> IndexCreateStatement
where
    T: IntoIden + 'static,
    C: IntoIden,
{
    Index::create()
        .name(name)
        .if_not_exists()
        .table(table)
        .col(column)
        .to_owned()
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Profiles {
    Table,
    Id,
    UserId,
    Name,
    AvatarColor,
    IsOwner,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Nodes {
    Table,
    Id,
    ProfileId,
    Kind,
    Label,
    Institution,
    Amount,
    Balance,
    Apy,
    Budgeted,
    Goal,
    Metadata,
    SortOrder,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Flows {
    Table,
    Id,
    ProfileId,
    FromNodeId,
    ToNodeId,
    Amount,
    Label,
    IsRecurring,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Budgets {
    Table,
    Id,
    ProfileId,
    NodeId,
    Name,
    Budgeted,
    Period,
    Color,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    BudgetId,
    Amount,
    Note,
    Date,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Goals {
    Table,
    Id,
    ProfileId,
    NodeId,
    Name,
    Target,
    Current,
    Deadline,
    Priority,
    Color,
    CreatedAt,
}

#[derive(DeriveIden)]
enum GoalTransactions {
    Table,
    Id,
    GoalId,
    Amount,
    Note,
    Date,
    CreatedAt,
}

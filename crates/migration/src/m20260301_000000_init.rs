//! Initial schema.
//!
//! - `users`: authentication
//! - `user_settings`: one settings document per user (color mode and the
//!   category forests as JSON)
//! - `accounts`: synced and manual bank accounts, keyed per user

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum UserSettings {
    Table,
    Id,
    DarkMode,
    Categories,
    UpdatedAt,
}

#[derive(Iden)]
enum Accounts {
    Table,
    UserId,
    SfAccountId,
    DisplayName,
    SfAccountName,
    SfName,
    Balance,
    SfBalanceDate,
    Source,
    Category,
    Hidden,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserSettings::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserSettings::DarkMode).boolean())
                    .col(ColumnDef::new(UserSettings::Categories).json())
                    .col(
                        ColumnDef::new(UserSettings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user_settings-id")
                            .from(UserSettings::Table, UserSettings::Id)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::UserId).string().not_null())
                    .col(ColumnDef::new(Accounts::SfAccountId).string().not_null())
                    .col(ColumnDef::new(Accounts::DisplayName).string())
                    .col(ColumnDef::new(Accounts::SfAccountName).string())
                    .col(ColumnDef::new(Accounts::SfName).string())
                    .col(
                        ColumnDef::new(Accounts::Balance)
                            .string()
                            .not_null()
                            .default("0"),
                    )
                    .col(ColumnDef::new(Accounts::SfBalanceDate).big_integer())
                    .col(
                        ColumnDef::new(Accounts::Source)
                            .string()
                            .not_null()
                            .default("simplefin-bridge"),
                    )
                    .col(ColumnDef::new(Accounts::Category).string())
                    .col(
                        ColumnDef::new(Accounts::Hidden)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .primary_key(
                        Index::create()
                            .col(Accounts::UserId)
                            .col(Accounts::SfAccountId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounts-user_id")
                            .from(Accounts::Table, Accounts::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-user_id-hidden")
                    .table(Accounts::Table)
                    .col(Accounts::UserId)
                    .col(Accounts::Hidden)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

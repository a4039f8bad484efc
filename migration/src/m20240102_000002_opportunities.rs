use sea_orm_migration::prelude::*;

use crate::m20240101_000001_crm_core::{Accounts, Campaigns, Contacts, Users};

// Soft-deleted rows keep their name, so uniqueness only covers live rows.
const UNIQUE_LIVE_NAME_SQL: &str = "CREATE UNIQUE INDEX IF NOT EXISTS \
    idx_opportunities_user_name ON opportunities (user_id, name) WHERE deleted_at IS NULL";

#[derive(DeriveIden)]
enum Opportunities {
    Table,
    Id,
    Uuid,
    UserId,
    CampaignId,
    AssignedTo,
    Name,
    Access,
    Source,
    Stage,
    Probability,
    AmountCents,
    DiscountCents,
    ClosesOn,
    Notes,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AccountOpportunities {
    Table,
    Id,
    AccountId,
    OpportunityId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ContactOpportunities {
    Table,
    Id,
    ContactId,
    OpportunityId,
    Role,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Permissions {
    Table,
    Id,
    UserId,
    AssetType,
    AssetId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Opportunities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Opportunities::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Opportunities::Uuid).uuid().not_null())
                    .col(ColumnDef::new(Opportunities::UserId).integer())
                    .col(ColumnDef::new(Opportunities::CampaignId).integer())
                    .col(ColumnDef::new(Opportunities::AssignedTo).integer())
                    .col(
                        ColumnDef::new(Opportunities::Name)
                            .string_len(64)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Opportunities::Access)
                            .string_len(8)
                            .not_null()
                            .default("Private"),
                    )
                    .col(ColumnDef::new(Opportunities::Source).string_len(32))
                    .col(ColumnDef::new(Opportunities::Stage).string_len(32))
                    .col(ColumnDef::new(Opportunities::Probability).integer())
                    .col(ColumnDef::new(Opportunities::AmountCents).big_integer())
                    .col(ColumnDef::new(Opportunities::DiscountCents).big_integer())
                    .col(ColumnDef::new(Opportunities::ClosesOn).date())
                    .col(ColumnDef::new(Opportunities::Notes).text())
                    .col(ColumnDef::new(Opportunities::DeletedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Opportunities::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Opportunities::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_opportunities_user")
                            .from(Opportunities::Table, Opportunities::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_opportunities_assignee")
                            .from(Opportunities::Table, Opportunities::AssignedTo)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_opportunities_campaign")
                            .from(Opportunities::Table, Opportunities::CampaignId)
                            .to(Campaigns::Table, Campaigns::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_opportunities_uuid")
                    .table(Opportunities::Table)
                    .col(Opportunities::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_opportunities_assigned_to")
                    .table(Opportunities::Table)
                    .col(Opportunities::AssignedTo)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(UNIQUE_LIVE_NAME_SQL)
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AccountOpportunities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountOpportunities::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AccountOpportunities::AccountId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountOpportunities::OpportunityId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountOpportunities::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_account_opportunities_account")
                            .from(AccountOpportunities::Table, AccountOpportunities::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_account_opportunities_opportunity")
                            .from(
                                AccountOpportunities::Table,
                                AccountOpportunities::OpportunityId,
                            )
                            .to(Opportunities::Table, Opportunities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_account_opportunities_opportunity")
                    .table(AccountOpportunities::Table)
                    .col(AccountOpportunities::OpportunityId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ContactOpportunities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContactOpportunities::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ContactOpportunities::ContactId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContactOpportunities::OpportunityId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ContactOpportunities::Role).string_len(32))
                    .col(
                        ColumnDef::new(ContactOpportunities::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contact_opportunities_contact")
                            .from(ContactOpportunities::Table, ContactOpportunities::ContactId)
                            .to(Contacts::Table, Contacts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contact_opportunities_opportunity")
                            .from(
                                ContactOpportunities::Table,
                                ContactOpportunities::OpportunityId,
                            )
                            .to(Opportunities::Table, Opportunities::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_contact_opportunities_pair")
                    .table(ContactOpportunities::Table)
                    .col(ContactOpportunities::ContactId)
                    .col(ContactOpportunities::OpportunityId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Permissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Permissions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Permissions::UserId).integer().not_null())
                    .col(ColumnDef::new(Permissions::AssetType).string_len(32).not_null())
                    .col(ColumnDef::new(Permissions::AssetId).integer().not_null())
                    .col(
                        ColumnDef::new(Permissions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Permissions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_permissions_user")
                            .from(Permissions::Table, Permissions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_permissions_asset")
                    .table(Permissions::Table)
                    .col(Permissions::AssetType)
                    .col(Permissions::AssetId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_permissions_user")
                    .table(Permissions::Table)
                    .col(Permissions::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Permissions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(ContactOpportunities::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(AccountOpportunities::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Opportunities::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

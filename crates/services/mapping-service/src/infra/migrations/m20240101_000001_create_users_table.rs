//! Migration: Create users table with role-specific workflow columns.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string_len(50).not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Role).string_len(16).not_null())
                    .col(ColumnDef::new(Users::MappingStatus).string_len(32).null())
                    .col(ColumnDef::new(Users::AssignedHrId).uuid().null())
                    .col(ColumnDef::new(Users::HrStatus).string_len(32).null())
                    .col(ColumnDef::new(Users::AdminManagerId).uuid().null())
                    .col(ColumnDef::new(Users::YearsOfExperience).integer().null())
                    .col(ColumnDef::new(Users::ResumePath).string().null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Cascade release looks candidates up by their HR
        manager
            .create_index(
                Index::create()
                    .name("idx_users_assigned_hr_id")
                    .table(Users::Table)
                    .col(Users::AssignedHrId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_role")
                    .table(Users::Table)
                    .col(Users::Role)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    Role,
    MappingStatus,
    AssignedHrId,
    HrStatus,
    AdminManagerId,
    YearsOfExperience,
    ResumePath,
    CreatedAt,
    UpdatedAt,
}

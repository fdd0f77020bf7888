//! Migration: Create mapping_requests table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MappingRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MappingRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MappingRequests::RequestType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(MappingRequests::RequesterId).uuid().not_null())
                    .col(
                        ColumnDef::new(MappingRequests::RequesterRole)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(MappingRequests::TargetId).uuid().not_null())
                    .col(
                        ColumnDef::new(MappingRequests::TargetRole)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(MappingRequests::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(MappingRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MappingRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Pending lookups go by either party plus status
        manager
            .create_index(
                Index::create()
                    .name("idx_mapping_requests_requester_status")
                    .table(MappingRequests::Table)
                    .col(MappingRequests::RequesterId)
                    .col(MappingRequests::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_mapping_requests_target_status")
                    .table(MappingRequests::Table)
                    .col(MappingRequests::TargetId)
                    .col(MappingRequests::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MappingRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MappingRequests {
    Table,
    Id,
    RequestType,
    RequesterId,
    RequesterRole,
    TargetId,
    TargetRole,
    Status,
    CreatedAt,
    UpdatedAt,
}

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 旧版作业表（自由文本 + 附件 JSON），迁移后只读
        manager
            .create_table(
                Table::create()
                    .table(Homeworks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Homeworks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Homeworks::TeacherId).big_integer().not_null())
                    .col(ColumnDef::new(Homeworks::StudentId).big_integer().not_null())
                    .col(ColumnDef::new(Homeworks::Text).text().null())
                    .col(ColumnDef::new(Homeworks::Attachments).text().null())
                    .col(ColumnDef::new(Homeworks::Status).string().null())
                    .col(
                        ColumnDef::new(Homeworks::IsDone)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Homeworks::Deadline).big_integer().null())
                    .col(
                        ColumnDef::new(Homeworks::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Homeworks::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Homeworks::CompletedAt).big_integer().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_homeworks_teacher_id")
                    .table(Homeworks::Table)
                    .col(Homeworks::TeacherId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Homeworks::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Homeworks {
    #[sea_orm(iden = "homeworks")]
    Table,
    Id,
    TeacherId,
    StudentId,
    Text,
    Attachments,
    Status,
    IsDone,
    Deadline,
    CreatedAt,
    UpdatedAt,
    CompletedAt,
}

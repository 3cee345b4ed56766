use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== 作业分配表 ====================
        manager
            .create_table(
                Table::create()
                    .table(HomeworkAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HomeworkAssignments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(HomeworkAssignments::LegacyHomeworkId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(HomeworkAssignments::TeacherId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HomeworkAssignments::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(HomeworkAssignments::Title).string().not_null())
                    .col(ColumnDef::new(HomeworkAssignments::Status).string().not_null())
                    .col(
                        ColumnDef::new(HomeworkAssignments::SendMode)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HomeworkAssignments::DeadlineAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(HomeworkAssignments::ContentSnapshot)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(HomeworkAssignments::SentAt).big_integer().null())
                    .col(
                        ColumnDef::new(HomeworkAssignments::ReviewedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(HomeworkAssignments::Reminder24hSentAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(HomeworkAssignments::ReminderMorningSentAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(HomeworkAssignments::Reminder3hSentAt)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(HomeworkAssignments::OverdueReminderCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(HomeworkAssignments::LastOverdueReminderAt)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(HomeworkAssignments::AutoScore).double().null())
                    .col(ColumnDef::new(HomeworkAssignments::ManualScore).double().null())
                    .col(ColumnDef::new(HomeworkAssignments::FinalScore).double().null())
                    .col(
                        ColumnDef::new(HomeworkAssignments::TeacherComment)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(HomeworkAssignments::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(HomeworkAssignments::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HomeworkAssignments::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 每条旧作业最多迁移一次（NULL 不参与唯一约束）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_homework_assignments_legacy_homework_id")
                    .table(HomeworkAssignments::Table)
                    .col(HomeworkAssignments::LegacyHomeworkId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 提醒扫描索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_homework_assignments_status_deadline")
                    .table(HomeworkAssignments::Table)
                    .col(HomeworkAssignments::Status)
                    .col(HomeworkAssignments::DeadlineAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_homework_assignments_student_id")
                    .table(HomeworkAssignments::Table)
                    .col(HomeworkAssignments::StudentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HomeworkAssignments::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum HomeworkAssignments {
    #[sea_orm(iden = "homework_assignments")]
    Table,
    Id,
    LegacyHomeworkId,
    TeacherId,
    StudentId,
    Title,
    Status,
    SendMode,
    DeadlineAt,
    ContentSnapshot,
    SentAt,
    ReviewedAt,
    #[sea_orm(iden = "reminder_24h_sent_at")]
    Reminder24hSentAt,
    ReminderMorningSentAt,
    #[sea_orm(iden = "reminder_3h_sent_at")]
    Reminder3hSentAt,
    OverdueReminderCount,
    LastOverdueReminderAt,
    AutoScore,
    ManualScore,
    FinalScore,
    TeacherComment,
    Version,
    CreatedAt,
    UpdatedAt,
}

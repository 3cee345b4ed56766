//! 旧作业迁移
//!
//! 把旧版自由格式作业一次性回填为结构化作业。迁移是确定性且幂等的：
//! 同一旧作业最多生成一条作业，重复执行只会计入 skipped。

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::errors::Result;
use crate::models::{
    assignments::{
        entities::{AssignmentStatus, SendMode},
        requests::NewAssignment,
    },
    legacy::{entities::LegacyHomework, responses::MigrationReport},
};
use crate::services::assignments::content;
use crate::storage::{AssignmentStore, LegacyHomeworkSource};

/// 旧状态归一化
///
/// `is_done` 优先；否则按旧状态文本（忽略大小写与首尾空白）映射。
pub fn normalize_status(is_done: bool, legacy_status: Option<&str>) -> AssignmentStatus {
    if is_done {
        return AssignmentStatus::Reviewed;
    }

    match legacy_status
        .map(|s| s.trim().to_ascii_uppercase())
        .as_deref()
    {
        Some("DONE") => AssignmentStatus::Reviewed,
        Some("ASSIGNED") | Some("IN_PROGRESS") => AssignmentStatus::Sent,
        _ => AssignmentStatus::Draft,
    }
}

/// 根据旧作业生成等价的作业创建参数（纯函数）
pub fn plan_migration(legacy: &LegacyHomework) -> NewAssignment {
    let status = normalize_status(legacy.is_done, legacy.status.as_deref());

    let sent_at = match status {
        AssignmentStatus::Sent | AssignmentStatus::Reviewed => Some(legacy.created_at),
        AssignmentStatus::Draft => None,
    };
    let reviewed_at = match status {
        AssignmentStatus::Reviewed => Some(legacy.completed_at.unwrap_or(legacy.updated_at)),
        _ => None,
    };

    NewAssignment {
        legacy_homework_id: Some(legacy.id),
        teacher_id: legacy.teacher_id,
        student_id: legacy.student_id,
        title: content::derive_title(legacy.text.as_deref()),
        status,
        send_mode: SendMode::Manual,
        deadline_at: legacy.deadline,
        content_snapshot: content::build_from_raw(
            legacy.text.as_deref(),
            legacy.attachments.as_deref(),
        ),
        sent_at,
        reviewed_at,
        created_at: legacy.created_at,
        updated_at: legacy.updated_at,
    }
}

enum RecordOutcome {
    Created,
    Skipped,
}

/// 分批驱动迁移
#[derive(Clone)]
pub struct LegacyMigrationService {
    legacy: Arc<dyn LegacyHomeworkSource>,
    assignments: Arc<dyn AssignmentStore>,
    batch_size: u64,
}

impl LegacyMigrationService {
    pub fn new(
        legacy: Arc<dyn LegacyHomeworkSource>,
        assignments: Arc<dyn AssignmentStore>,
        batch_size: u64,
    ) -> Self {
        Self {
            legacy,
            assignments,
            batch_size: batch_size.max(1),
        }
    }

    /// 从 cursor 之后开始迁移，直到读到空批次
    ///
    /// 冲突按已迁移处理；其他存储错误立即中止，已完成的记录保持不变，
    /// 重新执行即可续跑。
    pub async fn run(&self, cursor: Option<i64>, dry_run: bool) -> Result<MigrationReport> {
        let mut report = MigrationReport {
            last_cursor: cursor,
            dry_run,
            ..Default::default()
        };

        loop {
            let batch = self
                .legacy
                .list_legacy_homeworks_after(report.last_cursor, self.batch_size)
                .await?;
            if batch.is_empty() {
                break;
            }
            report.batches += 1;

            for record in &batch {
                report.scanned += 1;
                match self.migrate_record(record, dry_run).await {
                    Ok(RecordOutcome::Created) => report.created += 1,
                    Ok(RecordOutcome::Skipped) => report.skipped += 1,
                    Err(e) => {
                        error!(
                            "迁移旧作业 {} 失败，中止迁移: {} (已处理到 {:?})",
                            record.id, e, report.last_cursor
                        );
                        return Err(e);
                    }
                }
                report.last_cursor = Some(record.id);
            }

            info!(
                "迁移批次 {} 完成: 本批 {} 条, 累计 created={}, skipped={}, cursor={:?}",
                report.batches,
                batch.len(),
                report.created,
                report.skipped,
                report.last_cursor
            );
        }

        info!(
            "旧作业迁移完成{}: scanned={}, created={}, skipped={}, batches={}, last_cursor={:?}",
            if dry_run { "（演练）" } else { "" },
            report.scanned,
            report.created,
            report.skipped,
            report.batches,
            report.last_cursor
        );

        Ok(report)
    }

    async fn migrate_record(&self, record: &LegacyHomework, dry_run: bool) -> Result<RecordOutcome> {
        if self
            .assignments
            .get_assignment_by_legacy_id(record.id)
            .await?
            .is_some()
        {
            debug!("旧作业 {} 已迁移，跳过", record.id);
            return Ok(RecordOutcome::Skipped);
        }

        let plan = plan_migration(record);
        if dry_run {
            debug!("演练: 旧作业 {} 将迁移为 {} 状态", record.id, plan.status);
            return Ok(RecordOutcome::Created);
        }

        match self.assignments.create_assignment(plan).await {
            Ok(assignment) => {
                debug!("旧作业 {} 已迁移为作业 {}", record.id, assignment.id);
                Ok(RecordOutcome::Created)
            }
            // 并发迁移时由唯一索引兜底
            Err(e) if e.is_conflict() => {
                debug!("旧作业 {} 迁移冲突，视为已迁移: {}", record.id, e);
                Ok(RecordOutcome::Skipped)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignments::entities::ContentBlock;
    use crate::services::assignments::content::{PLACEHOLDER_TEXT, TITLE_MAX_CHARS};
    use crate::storage::memory_storage::MemoryStorage;
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn legacy(id: i64) -> LegacyHomework {
        LegacyHomework {
            id,
            teacher_id: 1,
            student_id: 100 + id,
            text: Some(format!("Homework #{id}")),
            attachments: None,
            status: Some("ASSIGNED".to_string()),
            is_done: false,
            deadline: Some(ts(1_800_000_000)),
            created_at: ts(1_700_000_000),
            updated_at: ts(1_700_000_500),
            completed_at: None,
        }
    }

    async fn seeded(count: i64) -> Arc<MemoryStorage> {
        let storage = Arc::new(MemoryStorage::new());
        for id in 1..=count {
            storage.insert_legacy_homework(legacy(id)).await;
        }
        storage
    }

    fn migration(storage: &Arc<MemoryStorage>, batch_size: u64) -> LegacyMigrationService {
        LegacyMigrationService::new(storage.clone(), storage.clone(), batch_size)
    }

    #[test]
    fn test_status_normalization_table() {
        let cases = [
            (true, Some("DONE"), AssignmentStatus::Reviewed),
            (true, Some("ASSIGNED"), AssignmentStatus::Reviewed),
            (true, Some("IN_PROGRESS"), AssignmentStatus::Reviewed),
            (true, None, AssignmentStatus::Reviewed),
            (false, Some(" done "), AssignmentStatus::Reviewed),
            (false, Some("assigned"), AssignmentStatus::Sent),
            (false, Some("In_Progress"), AssignmentStatus::Sent),
            (false, Some("ARCHIVED"), AssignmentStatus::Draft),
            (false, None, AssignmentStatus::Draft),
        ];

        for (is_done, status, expected) in cases {
            assert_eq!(
                normalize_status(is_done, status),
                expected,
                "is_done={is_done}, status={status:?}"
            );
        }
    }

    #[test]
    fn test_plan_sets_transition_timestamps() {
        let sent = plan_migration(&legacy(1));
        assert_eq!(sent.status, AssignmentStatus::Sent);
        assert_eq!(sent.sent_at, Some(ts(1_700_000_000)));
        assert_eq!(sent.reviewed_at, None);
        assert_eq!(sent.legacy_homework_id, Some(1));
        assert_eq!(sent.deadline_at, Some(ts(1_800_000_000)));

        let mut done = legacy(2);
        done.is_done = true;
        done.completed_at = Some(ts(1_700_100_000));
        let reviewed = plan_migration(&done);
        assert_eq!(reviewed.reviewed_at, Some(ts(1_700_100_000)));
        assert_eq!(reviewed.sent_at, Some(ts(1_700_000_000)));

        done.completed_at = None;
        assert_eq!(plan_migration(&done).reviewed_at, Some(ts(1_700_000_500)));

        let mut draft = legacy(3);
        draft.status = None;
        let draft = plan_migration(&draft);
        assert_eq!(draft.status, AssignmentStatus::Draft);
        assert!(draft.sent_at.is_none() && draft.reviewed_at.is_none());
    }

    #[test]
    fn test_plan_handles_empty_and_long_text() {
        let mut empty = legacy(1);
        empty.text = None;
        empty.attachments = Some("{broken".to_string());
        let plan = plan_migration(&empty);
        assert_eq!(plan.content_snapshot.len(), 1);
        assert!(matches!(
            &plan.content_snapshot[0],
            ContentBlock::Text { content, .. } if content == PLACEHOLDER_TEXT
        ));

        let mut long = legacy(2);
        long.text = Some("word ".repeat(60));
        let plan = plan_migration(&long);
        assert_eq!(plan.title.chars().count(), TITLE_MAX_CHARS);
        assert!(plan.title.ends_with("..."));
    }

    #[tokio::test]
    async fn test_migration_is_idempotent() {
        let storage = seeded(5).await;
        let migration = migration(&storage, 2);

        let first = migration.run(None, false).await.unwrap();
        assert_eq!(first.scanned, 5);
        assert_eq!(first.created, 5);
        assert_eq!(first.skipped, 0);
        assert_eq!(first.batches, 3);
        assert_eq!(first.last_cursor, Some(5));

        let second = migration.run(None, false).await.unwrap();
        assert_eq!(second.scanned, 5);
        assert_eq!(second.created, 0);
        assert_eq!(second.skipped, 5);
        assert_eq!(storage.assignment_count().await, 5);
    }

    #[tokio::test]
    async fn test_migration_resumes_from_cursor() {
        let storage = seeded(4).await;
        let migration = migration(&storage, 10);

        let report = migration.run(Some(2), false).await.unwrap();
        assert_eq!(report.scanned, 2);
        assert_eq!(report.created, 2);
        assert_eq!(report.last_cursor, Some(4));

        let migrated = storage.get_assignment_by_legacy_id(3).await.unwrap();
        assert!(migrated.is_some());
        assert!(storage.get_assignment_by_legacy_id(1).await.unwrap().is_none());

        // 空数据源：cursor 保持不变
        let report = migration.run(Some(4), false).await.unwrap();
        assert_eq!(report.batches, 0);
        assert_eq!(report.last_cursor, Some(4));
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let storage = seeded(3).await;
        let migration = migration(&storage, 2);

        let report = migration.run(None, true).await.unwrap();
        assert!(report.dry_run);
        assert_eq!(report.created, 3);
        assert_eq!(storage.assignment_count().await, 0);
    }
}

//! 内存存储实现
//!
//! 语义与 SeaORM 实现保持一致（唯一约束、版本条件更新、游标扫描），
//! 用于测试和 `memory://` 本地运行。

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::{HWSystemError, Result};
use crate::models::{
    CursorPage,
    assignments::{
        entities::Assignment,
        requests::{AssignmentPatch, NewAssignment},
        responses::AssignmentPage,
    },
    legacy::entities::LegacyHomework,
};
use crate::storage::{AssignmentStore, LegacyHomeworkSource};

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i64,
    assignments: BTreeMap<i64, Assignment>,
    legacy_homeworks: BTreeMap<i64, LegacyHomework>,
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: RwLock<MemoryState>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matches_url(url: &str) -> bool {
        url == "memory" || url.starts_with("memory://")
    }

    /// 写入旧作业数据（用于导入或测试）
    pub async fn insert_legacy_homework(&self, homework: LegacyHomework) {
        let mut state = self.state.write().await;
        state.legacy_homeworks.insert(homework.id, homework);
    }

    pub async fn assignment_count(&self) -> usize {
        self.state.read().await.assignments.len()
    }
}

fn apply_patch(assignment: &mut Assignment, patch: AssignmentPatch) {
    if let Some(title) = patch.title {
        assignment.title = title;
    }
    if let Some(status) = patch.status {
        assignment.status = status;
    }
    if let Some(deadline_at) = patch.deadline_at {
        assignment.deadline_at = Some(deadline_at);
    }
    if let Some(content_snapshot) = patch.content_snapshot {
        assignment.content_snapshot = content_snapshot;
    }
    if let Some(sent_at) = patch.sent_at {
        assignment.sent_at = Some(sent_at);
    }
    if let Some(reviewed_at) = patch.reviewed_at {
        assignment.reviewed_at = Some(reviewed_at);
    }
    if let Some(at) = patch.reminder_24h_sent_at {
        assignment.reminder_24h_sent_at = Some(at);
    }
    if let Some(at) = patch.reminder_morning_sent_at {
        assignment.reminder_morning_sent_at = Some(at);
    }
    if let Some(at) = patch.reminder_3h_sent_at {
        assignment.reminder_3h_sent_at = Some(at);
    }
    if let Some(count) = patch.overdue_reminder_count {
        assignment.overdue_reminder_count = count;
    }
    if let Some(at) = patch.last_overdue_reminder_at {
        assignment.last_overdue_reminder_at = Some(at);
    }
    if let Some(score) = patch.auto_score {
        assignment.auto_score = Some(score);
    }
    if let Some(score) = patch.manual_score {
        assignment.manual_score = Some(score);
    }
    if let Some(score) = patch.final_score {
        assignment.final_score = Some(score);
    }
    if let Some(comment) = patch.teacher_comment {
        assignment.teacher_comment = Some(comment);
    }
}

fn page_of<'a>(
    iter: impl Iterator<Item = &'a Assignment>,
    size: u64,
) -> AssignmentPage {
    let items: Vec<Assignment> = iter.take(size as usize).cloned().collect();
    CursorPage::from_items(items, size, |a| a.id)
}

#[async_trait]
impl AssignmentStore for MemoryStorage {
    async fn create_assignment(&self, req: NewAssignment) -> Result<Assignment> {
        let mut state = self.state.write().await;

        if let Some(legacy_id) = req.legacy_homework_id
            && state
                .assignments
                .values()
                .any(|a| a.legacy_homework_id == Some(legacy_id))
        {
            return Err(HWSystemError::conflict(format!(
                "旧作业已迁移: legacy_homework_id={legacy_id}"
            )));
        }

        state.next_id += 1;
        let assignment = Assignment {
            id: state.next_id,
            legacy_homework_id: req.legacy_homework_id,
            teacher_id: req.teacher_id,
            student_id: req.student_id,
            title: req.title,
            status: req.status,
            send_mode: req.send_mode,
            deadline_at: req.deadline_at,
            content_snapshot: req.content_snapshot,
            sent_at: req.sent_at,
            reviewed_at: req.reviewed_at,
            reminder_24h_sent_at: None,
            reminder_morning_sent_at: None,
            reminder_3h_sent_at: None,
            overdue_reminder_count: 0,
            last_overdue_reminder_at: None,
            auto_score: None,
            manual_score: None,
            final_score: None,
            teacher_comment: None,
            version: 0,
            created_at: req.created_at,
            updated_at: req.updated_at,
        };
        state.assignments.insert(assignment.id, assignment.clone());

        Ok(assignment)
    }

    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        Ok(self.state.read().await.assignments.get(&id).cloned())
    }

    async fn get_assignment_by_legacy_id(&self, legacy_id: i64) -> Result<Option<Assignment>> {
        Ok(self
            .state
            .read()
            .await
            .assignments
            .values()
            .find(|a| a.legacy_homework_id == Some(legacy_id))
            .cloned())
    }

    async fn update_assignment(
        &self,
        id: i64,
        expected_version: i64,
        patch: AssignmentPatch,
    ) -> Result<Assignment> {
        let mut state = self.state.write().await;
        let assignment = state
            .assignments
            .get_mut(&id)
            .ok_or_else(|| HWSystemError::not_found(format!("作业不存在: {id}")))?;

        if assignment.version != expected_version {
            return Err(HWSystemError::conflict(format!(
                "作业 {id} 已被并发修改: 期望版本 {expected_version}, 当前版本 {}",
                assignment.version
            )));
        }

        apply_patch(assignment, patch);
        assignment.version += 1;
        assignment.updated_at = chrono::Utc::now();

        Ok(assignment.clone())
    }

    async fn scan_assignments(&self, cursor: Option<i64>, size: u64) -> Result<AssignmentPage> {
        let state = self.state.read().await;
        let start = cursor.map_or(i64::MIN, |c| c.saturating_add(1));
        Ok(page_of(state.assignments.range(start..).map(|(_, a)| a), size))
    }

    async fn scan_reminder_candidates(
        &self,
        cursor: Option<i64>,
        size: u64,
    ) -> Result<AssignmentPage> {
        let state = self.state.read().await;
        let start = cursor.map_or(i64::MIN, |c| c.saturating_add(1));
        Ok(page_of(
            state
                .assignments
                .range(start..)
                .map(|(_, a)| a)
                .filter(|a| a.is_reminder_eligible()),
            size,
        ))
    }
}

#[async_trait]
impl LegacyHomeworkSource for MemoryStorage {
    async fn list_legacy_homeworks_after(
        &self,
        cursor: Option<i64>,
        limit: u64,
    ) -> Result<Vec<LegacyHomework>> {
        let state = self.state.read().await;
        let start = cursor.map_or(i64::MIN, |c| c.saturating_add(1));
        Ok(state
            .legacy_homeworks
            .range(start..)
            .take(limit as usize)
            .map(|(_, h)| h.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignments::entities::{AssignmentStatus, ContentBlock, SendMode};
    use chrono::Utc;

    fn new_assignment(legacy_homework_id: Option<i64>) -> NewAssignment {
        let now = Utc::now();
        NewAssignment {
            legacy_homework_id,
            teacher_id: 1,
            student_id: 2,
            title: "Read chapter 3".to_string(),
            status: AssignmentStatus::Draft,
            send_mode: SendMode::Manual,
            deadline_at: None,
            content_snapshot: vec![ContentBlock::Text {
                id: "b1".to_string(),
                content: "Read chapter 3".to_string(),
            }],
            sent_at: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_duplicate_legacy_id_conflicts() {
        let storage = MemoryStorage::new();
        storage.create_assignment(new_assignment(Some(7))).await.unwrap();

        let err = storage
            .create_assignment(new_assignment(Some(7)))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        // 没有旧作业引用的记录不受唯一约束影响
        storage.create_assignment(new_assignment(None)).await.unwrap();
        storage.create_assignment(new_assignment(None)).await.unwrap();
        assert_eq!(storage.assignment_count().await, 3);
    }

    #[tokio::test]
    async fn test_update_requires_expected_version() {
        let storage = MemoryStorage::new();
        let created = storage.create_assignment(new_assignment(None)).await.unwrap();

        let patch = AssignmentPatch {
            title: Some("Updated".to_string()),
            ..Default::default()
        };
        let updated = storage
            .update_assignment(created.id, 0, patch.clone())
            .await
            .unwrap();
        assert_eq!(updated.version, 1);
        assert_eq!(updated.title, "Updated");

        let err = storage
            .update_assignment(created.id, 0, patch.clone())
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let err = storage.update_assignment(999, 0, patch).await.unwrap_err();
        assert!(matches!(err, HWSystemError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_scan_pages_in_ascending_order() {
        let storage = MemoryStorage::new();
        for _ in 0..5 {
            storage.create_assignment(new_assignment(None)).await.unwrap();
        }

        let first = storage.scan_assignments(None, 2).await.unwrap();
        assert_eq!(first.items.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(first.next_cursor, Some(2));

        let second = storage.scan_assignments(first.next_cursor, 2).await.unwrap();
        assert_eq!(second.items.iter().map(|a| a.id).collect::<Vec<_>>(), vec![3, 4]);

        let last = storage.scan_assignments(second.next_cursor, 2).await.unwrap();
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.next_cursor, None);
    }

    #[tokio::test]
    async fn test_reminder_candidates_are_sent_with_deadline() {
        let storage = MemoryStorage::new();
        let draft = storage.create_assignment(new_assignment(None)).await.unwrap();

        let mut sent = new_assignment(None);
        sent.status = AssignmentStatus::Sent;
        sent.deadline_at = Some(Utc::now());
        let sent = storage.create_assignment(sent).await.unwrap();

        let mut sent_without_deadline = new_assignment(None);
        sent_without_deadline.status = AssignmentStatus::Sent;
        storage
            .create_assignment(sent_without_deadline)
            .await
            .unwrap();

        let page = storage.scan_reminder_candidates(None, 10).await.unwrap();
        let ids: Vec<i64> = page.items.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![sent.id]);
        assert!(!ids.contains(&draft.id));
    }
}

//! 作业存储操作

use super::SeaOrmStorage;
use crate::entity::homework_assignments::{ActiveModel, Column, Entity as HomeworkAssignments, Model};
use crate::errors::{HWSystemError, Result};
use crate::models::{
    CursorPage,
    assignments::{
        entities::{Assignment, AssignmentStatus},
        requests::{AssignmentPatch, NewAssignment},
        responses::AssignmentPage,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use tracing::warn;

impl SeaOrmStorage {
    /// 创建作业
    pub async fn create_assignment_impl(&self, req: NewAssignment) -> Result<Assignment> {
        let content_snapshot = serde_json::to_string(&req.content_snapshot)?;
        let legacy_homework_id = req.legacy_homework_id;

        let model = ActiveModel {
            legacy_homework_id: Set(req.legacy_homework_id),
            teacher_id: Set(req.teacher_id),
            student_id: Set(req.student_id),
            title: Set(req.title),
            status: Set(req.status.to_string()),
            send_mode: Set(req.send_mode.as_str().to_string()),
            deadline_at: Set(req.deadline_at.map(|dt| dt.timestamp())),
            content_snapshot: Set(content_snapshot),
            sent_at: Set(req.sent_at.map(|dt| dt.timestamp())),
            reviewed_at: Set(req.reviewed_at.map(|dt| dt.timestamp())),
            reminder_24h_sent_at: Set(None),
            reminder_morning_sent_at: Set(None),
            reminder_3h_sent_at: Set(None),
            overdue_reminder_count: Set(0),
            last_overdue_reminder_at: Set(None),
            auto_score: Set(None),
            manual_score: Set(None),
            final_score: Set(None),
            teacher_comment: Set(None),
            version: Set(0),
            created_at: Set(req.created_at.timestamp()),
            updated_at: Set(req.updated_at.timestamp()),
            ..Default::default()
        };

        // 唯一索引保证同一旧作业只会被插入一次
        let result = model.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => HWSystemError::conflict(format!(
                "旧作业已迁移: legacy_homework_id={legacy_homework_id:?}"
            )),
            _ => HWSystemError::database_operation(format!("创建作业失败: {e}")),
        })?;

        result.into_assignment()
    }

    /// 通过 ID 获取作业
    pub async fn get_assignment_by_id_impl(&self, id: i64) -> Result<Option<Assignment>> {
        let result = HomeworkAssignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| HWSystemError::database_operation(format!("查询作业失败: {e}")))?;

        result.map(Model::into_assignment).transpose()
    }

    /// 通过旧作业 ID 获取作业
    pub async fn get_assignment_by_legacy_id_impl(
        &self,
        legacy_id: i64,
    ) -> Result<Option<Assignment>> {
        let result = HomeworkAssignments::find()
            .filter(Column::LegacyHomeworkId.eq(legacy_id))
            .one(&self.db)
            .await
            .map_err(|e| HWSystemError::database_operation(format!("查询迁移作业失败: {e}")))?;

        result.map(Model::into_assignment).transpose()
    }

    /// 按期望版本更新作业
    pub async fn update_assignment_impl(
        &self,
        id: i64,
        expected_version: i64,
        patch: AssignmentPatch,
    ) -> Result<Assignment> {
        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            version: Set(expected_version + 1),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(title) = patch.title {
            model.title = Set(title);
        }

        if let Some(status) = patch.status {
            model.status = Set(status.to_string());
        }

        if let Some(deadline_at) = patch.deadline_at {
            model.deadline_at = Set(Some(deadline_at.timestamp()));
        }

        if let Some(content_snapshot) = patch.content_snapshot {
            model.content_snapshot = Set(serde_json::to_string(&content_snapshot)?);
        }

        if let Some(sent_at) = patch.sent_at {
            model.sent_at = Set(Some(sent_at.timestamp()));
        }

        if let Some(reviewed_at) = patch.reviewed_at {
            model.reviewed_at = Set(Some(reviewed_at.timestamp()));
        }

        if let Some(at) = patch.reminder_24h_sent_at {
            model.reminder_24h_sent_at = Set(Some(at.timestamp()));
        }

        if let Some(at) = patch.reminder_morning_sent_at {
            model.reminder_morning_sent_at = Set(Some(at.timestamp()));
        }

        if let Some(at) = patch.reminder_3h_sent_at {
            model.reminder_3h_sent_at = Set(Some(at.timestamp()));
        }

        if let Some(count) = patch.overdue_reminder_count {
            model.overdue_reminder_count = Set(count);
        }

        if let Some(at) = patch.last_overdue_reminder_at {
            model.last_overdue_reminder_at = Set(Some(at.timestamp()));
        }

        if let Some(score) = patch.auto_score {
            model.auto_score = Set(Some(score));
        }

        if let Some(score) = patch.manual_score {
            model.manual_score = Set(Some(score));
        }

        if let Some(score) = patch.final_score {
            model.final_score = Set(Some(score));
        }

        if let Some(comment) = patch.teacher_comment {
            model.teacher_comment = Set(Some(comment));
        }

        // 以版本号为条件更新，避免并发写覆盖
        let result = HomeworkAssignments::update_many()
            .set(model)
            .filter(Column::Id.eq(id))
            .filter(Column::Version.eq(expected_version))
            .exec(&self.db)
            .await
            .map_err(|e| HWSystemError::database_operation(format!("更新作业失败: {e}")))?;

        if result.rows_affected == 0 {
            return match self.get_assignment_by_id_impl(id).await? {
                None => Err(HWSystemError::not_found(format!("作业不存在: {id}"))),
                Some(current) => Err(HWSystemError::conflict(format!(
                    "作业 {id} 已被并发修改: 期望版本 {expected_version}, 当前版本 {}",
                    current.version
                ))),
            };
        }

        self.get_assignment_by_id_impl(id)
            .await?
            .ok_or_else(|| HWSystemError::not_found(format!("作业不存在: {id}")))
    }

    /// 游标扫描作业
    pub async fn scan_assignments_impl(
        &self,
        cursor: Option<i64>,
        size: u64,
        reminder_candidates_only: bool,
    ) -> Result<AssignmentPage> {
        let mut select = HomeworkAssignments::find();

        if let Some(cursor) = cursor {
            select = select.filter(Column::Id.gt(cursor));
        }

        if reminder_candidates_only {
            select = select
                .filter(Column::Status.eq(AssignmentStatus::SENT))
                .filter(Column::DeadlineAt.is_not_null());
        }

        let models = select
            .order_by_asc(Column::Id)
            .limit(size)
            .all(&self.db)
            .await
            .map_err(|e| HWSystemError::database_operation(format!("扫描作业失败: {e}")))?;

        // 游标按原始行推进，无法解析的行只记录日志，不阻塞后续扫描
        let page = CursorPage::from_items(models, size, |m| m.id);
        let items = page
            .items
            .into_iter()
            .filter_map(|m| {
                let id = m.id;
                m.into_assignment()
                    .map_err(|e| warn!("跳过无法解析的作业 {}: {}", id, e))
                    .ok()
            })
            .collect();

        Ok(CursorPage {
            items,
            next_cursor: page.next_cursor,
        })
    }
}

//! 作业分配实体

use sea_orm::entity::prelude::*;

use crate::errors::HWSystemError;
use crate::models::assignments::entities::{Assignment, ContentBlock};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "homework_assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub legacy_homework_id: Option<i64>,
    pub teacher_id: i64,
    pub student_id: i64,
    pub title: String,
    pub status: String,
    pub send_mode: String,
    pub deadline_at: Option<i64>,
    #[sea_orm(column_type = "Text")]
    pub content_snapshot: String,
    pub sent_at: Option<i64>,
    pub reviewed_at: Option<i64>,
    pub reminder_24h_sent_at: Option<i64>,
    pub reminder_morning_sent_at: Option<i64>,
    pub reminder_3h_sent_at: Option<i64>,
    pub overdue_reminder_count: i32,
    pub last_overdue_reminder_at: Option<i64>,
    pub auto_score: Option<f64>,
    pub manual_score: Option<f64>,
    pub final_score: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub teacher_comment: Option<String>,
    pub version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_assignment(self) -> crate::errors::Result<Assignment> {
        use chrono::{DateTime, Utc};

        let ts = |v: Option<i64>| v.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0));

        let status = self.status.parse().map_err(|e: String| {
            HWSystemError::database_operation(format!("作业 {} 状态无法解析: {e}", self.id))
        })?;
        let send_mode = self.send_mode.parse().map_err(|e: String| {
            HWSystemError::database_operation(format!("作业 {} 下发方式无法解析: {e}", self.id))
        })?;
        let content_snapshot: Vec<ContentBlock> = serde_json::from_str(&self.content_snapshot)
            .map_err(|e| {
                HWSystemError::serialization(format!("作业 {} 内容快照无法解析: {e}", self.id))
            })?;

        Ok(Assignment {
            id: self.id,
            legacy_homework_id: self.legacy_homework_id,
            teacher_id: self.teacher_id,
            student_id: self.student_id,
            title: self.title,
            status,
            send_mode,
            deadline_at: ts(self.deadline_at),
            content_snapshot,
            sent_at: ts(self.sent_at),
            reviewed_at: ts(self.reviewed_at),
            reminder_24h_sent_at: ts(self.reminder_24h_sent_at),
            reminder_morning_sent_at: ts(self.reminder_morning_sent_at),
            reminder_3h_sent_at: ts(self.reminder_3h_sent_at),
            overdue_reminder_count: self.overdue_reminder_count,
            last_overdue_reminder_at: ts(self.last_overdue_reminder_at),
            auto_score: self.auto_score,
            manual_score: self.manual_score,
            final_score: self.final_score,
            teacher_comment: self.teacher_comment,
            version: self.version,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        })
    }
}

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::models::assignments::entities::{AssignmentStatus, ContentBlock, SendMode};

/// 原始作业内容，附件允许任意 JSON，由内容快照构建器负责清洗
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentContent {
    pub text: Option<String>,
    #[serde(default)]
    pub attachments: Value,
}

/// 创建作业请求
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssignmentRequest {
    pub teacher_id: i64,
    pub student_id: i64,
    pub content: AssignmentContent,
    pub deadline_at: Option<DateTime<Utc>>, // ISO 8601 格式，如 "2026-01-24T12:00:00Z"
    pub send_mode: Option<SendMode>,
}

/// 修改草稿请求（仅 DRAFT 状态可用）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AmendDraftRequest {
    pub content: Option<AssignmentContent>,
    pub deadline_at: Option<DateTime<Utc>>,
}

/// 批改请求
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewAssignmentRequest {
    pub manual_score: Option<f64>,
    pub teacher_comment: Option<String>,
}

/// 自动评分回写请求
#[derive(Debug, Clone, Deserialize)]
pub struct AutoScoreRequest {
    pub score: f64,
}

/// 教师评语请求
#[derive(Debug, Clone, Deserialize)]
pub struct TeacherCommentRequest {
    pub comment: String,
}

// 用于存储层的创建参数，迁移可直接构造任意状态的记录
#[derive(Debug, Clone, PartialEq)]
pub struct NewAssignment {
    pub legacy_homework_id: Option<i64>,
    pub teacher_id: i64,
    pub student_id: i64,
    pub title: String,
    pub status: AssignmentStatus,
    pub send_mode: SendMode,
    pub deadline_at: Option<DateTime<Utc>>,
    pub content_snapshot: Vec<ContentBlock>,
    pub sent_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// 用于存储层的局部更新，None 表示保持原值
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentPatch {
    pub title: Option<String>,
    pub status: Option<AssignmentStatus>,
    pub deadline_at: Option<DateTime<Utc>>,
    pub content_snapshot: Option<Vec<ContentBlock>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reminder_24h_sent_at: Option<DateTime<Utc>>,
    pub reminder_morning_sent_at: Option<DateTime<Utc>>,
    pub reminder_3h_sent_at: Option<DateTime<Utc>>,
    pub overdue_reminder_count: Option<i32>,
    pub last_overdue_reminder_at: Option<DateTime<Utc>>,
    pub auto_score: Option<f64>,
    pub manual_score: Option<f64>,
    pub final_score: Option<f64>,
    pub teacher_comment: Option<String>,
}

impl AssignmentPatch {
    pub fn is_empty(&self) -> bool {
        *self == AssignmentPatch::default()
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 旧版作业记录（只读）
///
/// 字段保持旧表的宽松类型：附件是序列化后的 JSON 字符串，状态是自由文本，
/// 统一在迁移边界做校验和转换。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LegacyHomework {
    pub id: i64,
    pub teacher_id: i64,
    pub student_id: i64,
    pub text: Option<String>,
    pub attachments: Option<String>,
    pub status: Option<String>,
    pub is_done: bool,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

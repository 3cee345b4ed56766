use chrono::{DateTime, Utc};
use serde::Deserialize;

/// 手动触发一次提醒评估，now 为空时使用当前时间
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvaluateRemindersRequest {
    pub now: Option<DateTime<Utc>>,
}

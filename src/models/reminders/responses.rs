use serde::Serialize;

use crate::models::reminders::entities::DispatchSignal;

/// 单次提醒评估结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReminderEvaluation {
    pub scanned: u64,
    pub failed: u64,
    pub conflicts: u64,
    pub signals: Vec<DispatchSignal>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 提醒类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderKind {
    Reminder24h,     // 截止前 24 小时
    ReminderMorning, // 截止当天早晨
    Reminder3h,      // 截止前 3 小时
    Overdue,         // 逾期（按间隔重复）
}

impl ReminderKind {
    /// 全部提醒类型，按评估顺序排列
    pub const ALL: [ReminderKind; 4] = [
        ReminderKind::Reminder24h,
        ReminderKind::ReminderMorning,
        ReminderKind::Reminder3h,
        ReminderKind::Overdue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::Reminder24h => "REMINDER_24H",
            ReminderKind::ReminderMorning => "REMINDER_MORNING",
            ReminderKind::Reminder3h => "REMINDER_3H",
            ReminderKind::Overdue => "OVERDUE",
        }
    }
}

impl std::fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 投递信号：调度器决定发送什么，由外部通道负责实际发送
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DispatchSignal {
    pub assignment_id: i64,
    pub kind: ReminderKind,
    pub student_id: i64,
    pub title: String,
    pub deadline_at: DateTime<Utc>,
}

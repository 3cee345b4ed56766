use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 作业状态：DRAFT -> SENT -> REVIEWED
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Draft,    // 草稿
    Sent,     // 已下发
    Reviewed, // 已批改（终态）
}

impl AssignmentStatus {
    pub const DRAFT: &'static str = "DRAFT";
    pub const SENT: &'static str = "SENT";
    pub const REVIEWED: &'static str = "REVIEWED";

    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Draft => Self::DRAFT,
            AssignmentStatus::Sent => Self::SENT,
            AssignmentStatus::Reviewed => Self::REVIEWED,
        }
    }
}

impl<'de> Deserialize<'de> for AssignmentStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            AssignmentStatus::DRAFT => Ok(AssignmentStatus::Draft),
            AssignmentStatus::SENT => Ok(AssignmentStatus::Sent),
            AssignmentStatus::REVIEWED => Ok(AssignmentStatus::Reviewed),
            _ => Err(format!(
                "无效的作业状态: '{s}'. 支持的状态: DRAFT, SENT, REVIEWED"
            )),
        }
    }
}

// 下发方式
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SendMode {
    #[default]
    Manual, // 教师手动下发
    Auto,   // 自动下发
}

impl SendMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendMode::Manual => "MANUAL",
            SendMode::Auto => "AUTO",
        }
    }
}

impl std::str::FromStr for SendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MANUAL" => Ok(SendMode::Manual),
            "AUTO" => Ok(SendMode::Auto),
            _ => Err(format!("Invalid send mode: {s}")),
        }
    }
}

// 附件
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub url: String,
    pub file_name: String,
    pub size: u64,
}

/// 内容块
///
/// 序列化形式为 `{ id, type: "TEXT" | "MEDIA", content?, attachments? }`。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum ContentBlock {
    Text {
        id: String,
        content: String,
    },
    Media {
        id: String,
        attachments: Vec<Attachment>,
    },
}

impl ContentBlock {
    pub fn id(&self) -> &str {
        match self {
            ContentBlock::Text { id, .. } | ContentBlock::Media { id, .. } => id,
        }
    }
}

// 作业实体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assignment {
    pub id: i64,
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
    pub reminder_24h_sent_at: Option<DateTime<Utc>>,
    pub reminder_morning_sent_at: Option<DateTime<Utc>>,
    pub reminder_3h_sent_at: Option<DateTime<Utc>>,
    pub overdue_reminder_count: i32,
    pub last_overdue_reminder_at: Option<DateTime<Utc>>,
    pub auto_score: Option<f64>,
    pub manual_score: Option<f64>,
    pub final_score: Option<f64>,
    pub teacher_comment: Option<String>,
    // 乐观锁版本号，每次更新递增
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assignment {
    /// 是否需要参与截止提醒：仅已下发且设置了截止时间
    pub fn is_reminder_eligible(&self) -> bool {
        self.status == AssignmentStatus::Sent && self.deadline_at.is_some()
    }
}

//! 提醒时间窗口

use chrono::{DateTime, Duration, FixedOffset, Offset, Timelike, Utc};

use crate::config::ReminderConfig;
use crate::errors::{HWSystemError, Result};
use crate::models::assignments::entities::Assignment;
use crate::models::reminders::entities::ReminderKind;

const HOURS_BEFORE_24H: i64 = 24;
const HOURS_BEFORE_3H: i64 = 3;

#[derive(Debug, Clone)]
pub struct ReminderPolicy {
    morning_hour: u32,
    local_offset: FixedOffset,
    overdue_interval: Duration,
    overdue_max_count: i32,
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self {
            morning_hour: 9,
            local_offset: Utc.fix(),
            overdue_interval: Duration::minutes(24 * 60),
            overdue_max_count: 0,
        }
    }
}

impl ReminderPolicy {
    pub fn from_config(config: &ReminderConfig) -> Result<Self> {
        let local_offset = FixedOffset::east_opt(config.utc_offset_minutes * 60).ok_or_else(|| {
            HWSystemError::config(format!(
                "reminders.utc_offset_minutes out of range: {}",
                config.utc_offset_minutes
            ))
        })?;

        if config.morning_hour > 23 {
            return Err(HWSystemError::config(format!(
                "reminders.morning_hour must be within 0..=23, got {}",
                config.morning_hour
            )));
        }

        Ok(Self {
            morning_hour: config.morning_hour,
            local_offset,
            overdue_interval: Duration::minutes(config.overdue_interval_minutes.max(1)),
            overdue_max_count: config.overdue_max_count.max(0),
        })
    }

    /// 当前时刻应发送的提醒类型，已发送过的提醒不会再次返回
    pub fn due_kinds(&self, assignment: &Assignment, now: DateTime<Utc>) -> Vec<ReminderKind> {
        let Some(deadline) = assignment.deadline_at else {
            return Vec::new();
        };

        ReminderKind::ALL
            .into_iter()
            .filter(|kind| self.in_window(*kind, deadline, now))
            .filter(|kind| !self.already_fired(assignment, *kind, now))
            .collect()
    }

    fn in_window(&self, kind: ReminderKind, deadline: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match kind {
            ReminderKind::Overdue => now >= deadline,
            _ if now >= deadline => false,
            ReminderKind::Reminder24h => now >= deadline - Duration::hours(HOURS_BEFORE_24H),
            ReminderKind::Reminder3h => now >= deadline - Duration::hours(HOURS_BEFORE_3H),
            ReminderKind::ReminderMorning => {
                let local_now = now.with_timezone(&self.local_offset);
                let local_deadline = deadline.with_timezone(&self.local_offset);
                local_now.date_naive() == local_deadline.date_naive()
                    && local_now.hour() >= self.morning_hour
            }
        }
    }

    /// 一次性提醒看发送时间；逾期提醒看上限和发送间隔
    fn already_fired(
        &self,
        assignment: &Assignment,
        kind: ReminderKind,
        now: DateTime<Utc>,
    ) -> bool {
        match kind {
            ReminderKind::Reminder24h => assignment.reminder_24h_sent_at.is_some(),
            ReminderKind::ReminderMorning => assignment.reminder_morning_sent_at.is_some(),
            ReminderKind::Reminder3h => assignment.reminder_3h_sent_at.is_some(),
            ReminderKind::Overdue => {
                let capped = self.overdue_max_count > 0
                    && assignment.overdue_reminder_count >= self.overdue_max_count;
                capped
                    || assignment
                        .last_overdue_reminder_at
                        .is_some_and(|last| now - last < self.overdue_interval)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignments::entities::{AssignmentStatus, SendMode};
    use chrono::TimeZone;

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, d, h, m, 0).unwrap()
    }

    fn sent_assignment(deadline: DateTime<Utc>) -> Assignment {
        let created = at(1, 0, 0);
        Assignment {
            id: 1,
            legacy_homework_id: None,
            teacher_id: 1,
            student_id: 2,
            title: "Scales".to_string(),
            status: AssignmentStatus::Sent,
            send_mode: SendMode::Manual,
            deadline_at: Some(deadline),
            content_snapshot: Vec::new(),
            sent_at: Some(created),
            reviewed_at: None,
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
            created_at: created,
            updated_at: created,
        }
    }

    fn config(utc_offset_minutes: i32) -> ReminderConfig {
        ReminderConfig {
            enabled: true,
            tick_interval_secs: 60,
            batch_size: 100,
            concurrency: 4,
            dispatch_timeout_ms: 1000,
            morning_hour: 9,
            utc_offset_minutes,
            overdue_interval_minutes: 60,
            overdue_max_count: 2,
        }
    }

    #[test]
    fn test_one_shot_windows() {
        let policy = ReminderPolicy::default();
        let deadline = at(10, 20, 0);
        let assignment = sent_assignment(deadline);

        assert!(policy.due_kinds(&assignment, at(9, 19, 0)).is_empty());
        assert_eq!(
            policy.due_kinds(&assignment, at(9, 20, 0)),
            vec![ReminderKind::Reminder24h]
        );
        assert_eq!(
            policy.due_kinds(&assignment, at(10, 8, 59)),
            vec![ReminderKind::Reminder24h]
        );
        assert_eq!(
            policy.due_kinds(&assignment, at(10, 9, 0)),
            vec![ReminderKind::Reminder24h, ReminderKind::ReminderMorning]
        );
        assert_eq!(
            policy.due_kinds(&assignment, at(10, 17, 30)),
            vec![
                ReminderKind::Reminder24h,
                ReminderKind::ReminderMorning,
                ReminderKind::Reminder3h
            ]
        );
    }

    #[test]
    fn test_sent_kinds_are_not_repeated() {
        let policy = ReminderPolicy::default();
        let mut assignment = sent_assignment(at(10, 20, 0));
        assignment.reminder_24h_sent_at = Some(at(9, 21, 0));
        assignment.reminder_morning_sent_at = Some(at(10, 9, 0));

        assert_eq!(
            policy.due_kinds(&assignment, at(10, 18, 0)),
            vec![ReminderKind::Reminder3h]
        );
    }

    #[test]
    fn test_morning_uses_local_offset() {
        // UTC+8: 截止 03-10 02:00 UTC 即本地 10:00
        let policy = ReminderPolicy::from_config(&config(8 * 60)).unwrap();
        let assignment = sent_assignment(at(10, 2, 0));

        // 本地 03-10 09:30
        assert!(
            policy
                .due_kinds(&assignment, at(10, 1, 30))
                .contains(&ReminderKind::ReminderMorning)
        );
        // 本地 03-10 08:30
        assert!(
            !policy
                .due_kinds(&assignment, at(10, 0, 30))
                .contains(&ReminderKind::ReminderMorning)
        );
    }

    #[test]
    fn test_overdue_cadence_and_cap() {
        let policy = ReminderPolicy::from_config(&config(0)).unwrap();
        let deadline = at(10, 20, 0);
        let mut assignment = sent_assignment(deadline);

        assert_eq!(policy.due_kinds(&assignment, deadline), vec![ReminderKind::Overdue]);

        assignment.overdue_reminder_count = 1;
        assignment.last_overdue_reminder_at = Some(deadline);
        assert!(policy.due_kinds(&assignment, at(10, 20, 59)).is_empty());
        assert_eq!(
            policy.due_kinds(&assignment, at(10, 21, 0)),
            vec![ReminderKind::Overdue]
        );

        assignment.overdue_reminder_count = 2;
        assert!(policy.due_kinds(&assignment, at(11, 20, 0)).is_empty());
    }

    #[test]
    fn test_from_config_rejects_bad_offset() {
        let err = ReminderPolicy::from_config(&config(24 * 60)).unwrap_err();
        assert!(matches!(err, HWSystemError::Config(_)));
    }
}

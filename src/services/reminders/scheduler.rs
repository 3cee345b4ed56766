use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures_util::{StreamExt, stream};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{ReminderDispatcher, ReminderPolicy};
use crate::config::ReminderConfig;
use crate::errors::Result;
use crate::models::{
    assignments::{
        entities::{Assignment, AssignmentStatus},
        requests::AssignmentPatch,
    },
    reminders::{
        entities::{DispatchSignal, ReminderKind},
        responses::ReminderEvaluation,
    },
};
use crate::storage::AssignmentStore;

/// 投递成功后写回提醒字段的最大尝试次数
const MAX_RECORD_ATTEMPTS: usize = 3;

#[derive(Debug, Default)]
struct AssignmentOutcome {
    signals: Vec<DispatchSignal>,
    failed: u64,
    conflicted: bool,
}

/// 提醒调度器
///
/// 单个作业的评估在进程内互斥执行（读取、判定、投递、写回），
/// 写回以读取时的版本号为条件；不同作业之间并发评估。
pub struct ReminderScheduler {
    storage: Arc<dyn AssignmentStore>,
    dispatcher: Arc<dyn ReminderDispatcher>,
    policy: ReminderPolicy,
    batch_size: u64,
    concurrency: usize,
    dispatch_timeout: Duration,
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl ReminderScheduler {
    pub fn new(
        storage: Arc<dyn AssignmentStore>,
        dispatcher: Arc<dyn ReminderDispatcher>,
        policy: ReminderPolicy,
    ) -> Self {
        Self {
            storage,
            dispatcher,
            policy,
            batch_size: 100,
            concurrency: 8,
            dispatch_timeout: Duration::from_secs(5),
            locks: DashMap::new(),
        }
    }

    pub fn from_config(
        storage: Arc<dyn AssignmentStore>,
        dispatcher: Arc<dyn ReminderDispatcher>,
        config: &ReminderConfig,
    ) -> Result<Self> {
        let policy = ReminderPolicy::from_config(config)?;
        Ok(Self::new(storage, dispatcher, policy)
            .with_batch_size(config.batch_size)
            .with_concurrency(config.concurrency)
            .with_dispatch_timeout(Duration::from_millis(config.dispatch_timeout_ms)))
    }

    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_dispatch_timeout(mut self, timeout: Duration) -> Self {
        self.dispatch_timeout = timeout;
        self
    }

    /// 以 `now` 为评估时刻扫描全部候选作业
    pub async fn evaluate_reminders(&self, now: DateTime<Utc>) -> Result<ReminderEvaluation> {
        let mut evaluation = ReminderEvaluation::default();
        let mut cursor = None;

        loop {
            let page = self
                .storage
                .scan_reminder_candidates(cursor, self.batch_size)
                .await?;
            evaluation.scanned += page.items.len() as u64;

            let outcomes: Vec<(i64, Result<AssignmentOutcome>)> = stream::iter(page.items)
                .map(move |assignment| async move {
                    let id = assignment.id;
                    (id, self.evaluate_assignment(id, now).await)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

            for (id, outcome) in outcomes {
                match outcome {
                    Ok(outcome) => {
                        evaluation.failed += outcome.failed;
                        evaluation.conflicts += u64::from(outcome.conflicted);
                        evaluation.signals.extend(outcome.signals);
                    }
                    Err(e) => {
                        warn!("作业 {} 提醒评估失败: {}", id, e);
                        evaluation.failed += 1;
                    }
                }
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        // 并发评估后按作业排序，同一作业内保持类型顺序
        evaluation.signals.sort_by_key(|s| s.assignment_id);
        Ok(evaluation)
    }

    async fn evaluate_assignment(&self, id: i64, now: DateTime<Utc>) -> Result<AssignmentOutcome> {
        let lock = self
            .locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = lock.lock().await;
            self.evaluate_locked(id, now).await
        };

        drop(lock);
        self.locks.remove_if(&id, |_, l| Arc::strong_count(l) == 1);

        result
    }

    async fn evaluate_locked(&self, id: i64, now: DateTime<Utc>) -> Result<AssignmentOutcome> {
        let mut outcome = AssignmentOutcome::default();

        // 加锁后重新读取，扫描结果可能已过期
        let Some(current) = self.storage.get_assignment_by_id(id).await? else {
            return Ok(outcome);
        };
        let Some(deadline_at) = current.deadline_at.filter(|_| current.is_reminder_eligible())
        else {
            return Ok(outcome);
        };

        let due = self.policy.due_kinds(&current, now);
        if due.is_empty() {
            return Ok(outcome);
        }

        let mut fired = Vec::with_capacity(due.len());
        for kind in due {
            let signal = DispatchSignal {
                assignment_id: current.id,
                kind,
                student_id: current.student_id,
                title: current.title.clone(),
                deadline_at,
            };

            match tokio::time::timeout(self.dispatch_timeout, self.dispatcher.dispatch(&signal))
                .await
            {
                Ok(Ok(())) => {
                    fired.push(kind);
                    outcome.signals.push(signal);
                }
                Ok(Err(e)) => {
                    warn!("作业 {} 的 {} 提醒投递失败: {}", id, kind, e);
                    outcome.failed += 1;
                }
                Err(_) => {
                    warn!(
                        "作业 {} 的 {} 提醒投递超时 ({:?})",
                        id, kind, self.dispatch_timeout
                    );
                    outcome.failed += 1;
                }
            }
        }

        if fired.is_empty() {
            return Ok(outcome);
        }

        // 提醒已发出，写回失败也要返回信号
        match self.record_fired(current, &fired, now).await {
            Ok(()) => debug!("作业 {} 已记录提醒: {} 条", id, fired.len()),
            Err(e) if e.is_conflict() => {
                warn!("作业 {} 提醒写回持续冲突，放弃记录: {}", id, e);
                outcome.conflicted = true;
            }
            Err(e) => {
                warn!("作业 {} 提醒写回失败: {}", id, e);
                outcome.failed += 1;
            }
        }

        Ok(outcome)
    }

    /// 把已投递的提醒写回存储
    ///
    /// 提醒字段与生命周期、评分字段互不重叠，版本冲突时重新读取并只重放提醒字段；
    /// 作业已不再处于 SENT 时不再记录。
    async fn record_fired(
        &self,
        mut current: Assignment,
        fired: &[ReminderKind],
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut attempt = 1;
        loop {
            let patch = reminder_patch(&current, fired, now);
            if patch.is_empty() {
                return Ok(());
            }

            let err = match self
                .storage
                .update_assignment(current.id, current.version, patch)
                .await
            {
                Ok(_) => return Ok(()),
                Err(e) if e.is_conflict() && attempt < MAX_RECORD_ATTEMPTS => e,
                Err(e) => return Err(e),
            };

            debug!(
                "作业 {} 提醒写回冲突 (第 {} 次)，重新读取: {}",
                current.id, attempt, err
            );
            current = match self.storage.get_assignment_by_id(current.id).await? {
                Some(fresh) if fresh.status == AssignmentStatus::Sent => fresh,
                _ => {
                    debug!("作业 {} 已不再处于 SENT，跳过提醒记录", current.id);
                    return Ok(());
                }
            };
            attempt += 1;
        }
    }
}

fn reminder_patch(
    current: &Assignment,
    fired: &[ReminderKind],
    now: DateTime<Utc>,
) -> AssignmentPatch {
    let mut patch = AssignmentPatch::default();
    for kind in fired {
        match kind {
            ReminderKind::Reminder24h if current.reminder_24h_sent_at.is_none() => {
                patch.reminder_24h_sent_at = Some(now)
            }
            ReminderKind::ReminderMorning if current.reminder_morning_sent_at.is_none() => {
                patch.reminder_morning_sent_at = Some(now)
            }
            ReminderKind::Reminder3h if current.reminder_3h_sent_at.is_none() => {
                patch.reminder_3h_sent_at = Some(now)
            }
            ReminderKind::Overdue => {
                patch.overdue_reminder_count = Some(current.overdue_reminder_count + 1);
                patch.last_overdue_reminder_at = Some(now);
            }
            _ => {}
        }
    }
    patch
}

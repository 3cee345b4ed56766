use async_trait::async_trait;
use tracing::info;

use crate::errors::Result;
use crate::models::reminders::entities::DispatchSignal;

/// 提醒投递通道
///
/// 返回 `Ok` 即视为已送达，调度器随后持久化对应的提醒记录；
/// 返回错误或超时则本次不记录，下一轮重试。
#[async_trait]
pub trait ReminderDispatcher: Send + Sync {
    async fn dispatch(&self, signal: &DispatchSignal) -> Result<()>;
}

/// 只写日志的投递实现
#[derive(Debug, Default, Clone)]
pub struct LogReminderDispatcher;

#[async_trait]
impl ReminderDispatcher for LogReminderDispatcher {
    async fn dispatch(&self, signal: &DispatchSignal) -> Result<()> {
        info!(
            assignment_id = signal.assignment_id,
            student_id = signal.student_id,
            kind = %signal.kind,
            deadline_at = %signal.deadline_at,
            "发送作业提醒: {}",
            signal.title
        );
        Ok(())
    }
}

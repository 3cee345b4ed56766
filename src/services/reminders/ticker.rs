use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::ReminderScheduler;

/// 定时驱动提醒评估
///
/// 单轮失败只记录日志，不会退出循环。
pub struct ReminderTicker {
    scheduler: Arc<ReminderScheduler>,
    interval: Duration,
}

impl ReminderTicker {
    pub fn new(scheduler: Arc<ReminderScheduler>, interval_secs: u64) -> Self {
        Self {
            scheduler,
            interval: Duration::from_secs(interval_secs.max(1)),
        }
    }

    pub async fn start(self) {
        info!("提醒调度已启动 (间隔: {:?})", self.interval);

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            match self.scheduler.evaluate_reminders(Utc::now()).await {
                Ok(evaluation) if evaluation.signals.is_empty() && evaluation.failed == 0 => {
                    debug!("提醒评估完成: 扫描 {} 条，无需发送", evaluation.scanned);
                }
                Ok(evaluation) => {
                    info!(
                        "提醒评估完成: scanned={}, sent={}, failed={}, conflicts={}",
                        evaluation.scanned,
                        evaluation.signals.len(),
                        evaluation.failed,
                        evaluation.conflicts
                    );
                }
                Err(e) => {
                    warn!("提醒评估失败，等待下一轮: {}", e);
                }
            }
        }
    }
}

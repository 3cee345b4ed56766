use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::errors::Result;
use crate::services::{
    AssignmentService, LegacyMigrationService, LogReminderDispatcher, ReminderScheduler,
    ReminderTicker,
};

pub struct StartupContext {
    pub assignments: AssignmentService,
    pub migration: LegacyMigrationService,
    pub scheduler: Arc<ReminderScheduler>,
}

impl StartupContext {
    /// 提醒调度开启时返回定时器，由调用方决定在哪里运行
    pub fn reminder_ticker(&self) -> Option<ReminderTicker> {
        let reminders = &AppConfig::get().reminders;
        if !reminders.enabled {
            warn!("Reminder scheduler is disabled by configuration");
            return None;
        }
        Some(ReminderTicker::new(
            self.scheduler.clone(),
            reminders.tick_interval_secs,
        ))
    }
}

/// 启动时回填旧作业
///
/// 迁移失败不阻止服务启动，已迁移的记录保持不变，可通过接口续跑。
async fn run_startup_migration(migration: &LegacyMigrationService) {
    let config = &AppConfig::get().migration;
    if !config.run_on_startup {
        return;
    }

    warn!(
        "Running legacy homework migration on startup (dry_run: {})",
        config.dry_run
    );
    match migration.run(None, config.dry_run).await {
        Ok(report) => info!(
            "Startup migration finished: created={}, skipped={}, last_cursor={:?}",
            report.created, report.skipped, report.last_cursor
        ),
        Err(e) => error!("Startup migration aborted: {}", e),
    }
}

/// 准备服务器启动的上下文
/// 包括存储、业务服务和提醒调度器
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let config = AppConfig::get();

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    let assignments = AssignmentService::new(storage.assignments.clone());
    let migration = LegacyMigrationService::new(
        storage.legacy.clone(),
        storage.assignments.clone(),
        config.migration.batch_size,
    );

    run_startup_migration(&migration).await;

    let scheduler = ReminderScheduler::from_config(
        storage.assignments.clone(),
        Arc::new(LogReminderDispatcher),
        &config.reminders,
    )?;
    warn!("Reminder scheduler initialized");

    Ok(StartupContext {
        assignments,
        migration,
        scheduler: Arc::new(scheduler),
    })
}

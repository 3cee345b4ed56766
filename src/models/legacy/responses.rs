use serde::Serialize;

/// 迁移统计
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct MigrationReport {
    pub scanned: u64,
    pub created: u64,
    pub skipped: u64,
    pub batches: u64,
    // 本次处理到的最后一条旧作业 ID，调用方可持久化后用于续跑
    pub last_cursor: Option<i64>,
    pub dry_run: bool,
}

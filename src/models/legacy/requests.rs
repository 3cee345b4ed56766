use serde::Deserialize;

/// 手动触发旧作业迁移
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyMigrationRequest {
    // 从该 ID 之后继续（不含），为空则从头开始
    pub cursor: Option<i64>,
    pub dry_run: Option<bool>,
}

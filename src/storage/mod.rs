use std::sync::Arc;

use crate::models::{
    assignments::{
        entities::Assignment,
        requests::{AssignmentPatch, NewAssignment},
        responses::AssignmentPage,
    },
    legacy::entities::LegacyHomework,
};

use crate::config::AppConfig;
use crate::errors::Result;

pub mod memory_storage;
pub mod sea_orm_storage;

/// 作业持久化契约
///
/// 所有写操作都是单条记录原子的；`update_assignment` 以版本号为条件，
/// 版本不一致时返回 `Conflict`，调用方据此识别并发竞争。
#[async_trait::async_trait]
pub trait AssignmentStore: Send + Sync {
    // 创建作业，legacy_homework_id 已被占用时返回 Conflict
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment>;
    // 通过ID获取作业
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    // 通过旧作业ID获取已迁移的作业
    async fn get_assignment_by_legacy_id(&self, legacy_id: i64) -> Result<Option<Assignment>>;
    // 按期望版本更新作业，成功后版本号加一
    async fn update_assignment(
        &self,
        id: i64,
        expected_version: i64,
        patch: AssignmentPatch,
    ) -> Result<Assignment>;
    // 按 ID 升序游标扫描
    async fn scan_assignments(&self, cursor: Option<i64>, size: u64) -> Result<AssignmentPage>;
    // 扫描需要提醒的作业（已下发且有截止时间）
    async fn scan_reminder_candidates(
        &self,
        cursor: Option<i64>,
        size: u64,
    ) -> Result<AssignmentPage>;
}

/// 旧作业只读数据源
#[async_trait::async_trait]
pub trait LegacyHomeworkSource: Send + Sync {
    // 按 ID 升序返回 cursor 之后的最多 limit 条旧作业
    async fn list_legacy_homeworks_after(
        &self,
        cursor: Option<i64>,
        limit: u64,
    ) -> Result<Vec<LegacyHomework>>;
}

/// 同一存储后端的两种视图
#[derive(Clone)]
pub struct StorageHandles {
    pub assignments: Arc<dyn AssignmentStore>,
    pub legacy: Arc<dyn LegacyHomeworkSource>,
}

impl StorageHandles {
    pub fn from_backend<S>(backend: Arc<S>) -> Self
    where
        S: AssignmentStore + LegacyHomeworkSource + 'static,
    {
        Self {
            assignments: backend.clone(),
            legacy: backend,
        }
    }
}

pub async fn create_storage() -> Result<StorageHandles> {
    let config = AppConfig::get();
    if memory_storage::MemoryStorage::matches_url(&config.database.url) {
        tracing::warn!("Using in-memory storage, data will be lost on shutdown");
        return Ok(StorageHandles::from_backend(Arc::new(
            memory_storage::MemoryStorage::new(),
        )));
    }

    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(StorageHandles::from_backend(Arc::new(storage)))
}

//! 旧作业读取操作

use super::SeaOrmStorage;
use crate::entity::legacy_homeworks::{Column, Entity as LegacyHomeworks, Model};
use crate::errors::{HWSystemError, Result};
use crate::models::legacy::entities::LegacyHomework;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

impl SeaOrmStorage {
    /// 按 ID 升序读取 cursor 之后的旧作业
    pub async fn list_legacy_homeworks_after_impl(
        &self,
        cursor: Option<i64>,
        limit: u64,
    ) -> Result<Vec<LegacyHomework>> {
        let mut select = LegacyHomeworks::find();

        if let Some(cursor) = cursor {
            select = select.filter(Column::Id.gt(cursor));
        }

        let models = select
            .order_by_asc(Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| HWSystemError::database_operation(format!("查询旧作业失败: {e}")))?;

        Ok(models.into_iter().map(Model::into_legacy_homework).collect())
    }
}

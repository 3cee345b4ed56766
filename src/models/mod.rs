//! 数据模型定义
//!
//! 与 `entity` 中的数据库实体分离，供服务层、存储层和路由层共用。

pub mod assignments;
pub mod common;
pub mod legacy;
pub mod reminders;

pub use common::error_code::ErrorCode;
pub use common::pagination::{CursorPage, CursorQuery};
pub use common::response::ApiResponse;

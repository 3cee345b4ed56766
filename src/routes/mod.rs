pub mod assignments;

pub mod migrations;

pub mod reminders;

pub use assignments::configure_assignments_routes;
pub use migrations::configure_migrations_routes;
pub use reminders::configure_reminders_routes;

use actix_web::HttpResponse;
use serde::Serialize;

use crate::errors::Result;
use crate::models::ApiResponse;

/// 把服务层结果转换为统一响应
pub(crate) fn respond<T: Serialize>(result: Result<T>, message: &str) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok().json(ApiResponse::success(data, message)),
        Err(e) => ApiResponse::<()>::from_error(&e),
    }
}

use actix_web::{HttpResponse, Result as ActixResult, web};
use chrono::Utc;

use crate::models::reminders::requests::EvaluateRemindersRequest;
use crate::routes::respond;
use crate::services::ReminderScheduler;

// 手动触发一次提醒评估
pub async fn evaluate_reminders(
    scheduler: web::Data<ReminderScheduler>,
    body: web::Json<EvaluateRemindersRequest>,
) -> ActixResult<HttpResponse> {
    let now = body.into_inner().now.unwrap_or_else(Utc::now);
    Ok(respond(scheduler.evaluate_reminders(now).await, "提醒评估完成"))
}

pub fn configure_reminders_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/reminders")
            .service(web::resource("/evaluate").route(web::post().to(evaluate_reminders))),
    );
}

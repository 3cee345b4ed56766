use actix_web::{HttpResponse, Result as ActixResult, web};

use crate::models::assignments::requests::{
    AmendDraftRequest, AutoScoreRequest, CreateAssignmentRequest, ReviewAssignmentRequest,
    TeacherCommentRequest,
};
use crate::models::{ApiResponse, CursorQuery};
use crate::routes::respond;
use crate::services::AssignmentService;

// 列出作业
pub async fn list_assignments(
    service: web::Data<AssignmentService>,
    query: web::Query<CursorQuery>,
) -> ActixResult<HttpResponse> {
    let result = service
        .list_assignments(query.cursor, query.clamped_size())
        .await;
    Ok(respond(result, "查询成功"))
}

// 创建作业（草稿）
pub async fn create_assignment(
    service: web::Data<AssignmentService>,
    body: web::Json<CreateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    match service.create_assignment(body.into_inner()).await {
        Ok(assignment) => {
            Ok(HttpResponse::Created().json(ApiResponse::success(assignment, "作业创建成功")))
        }
        Err(e) => Ok(ApiResponse::<()>::from_error(&e)),
    }
}

// 获取作业详情
pub async fn get_assignment(
    service: web::Data<AssignmentService>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    Ok(respond(service.get_assignment(path.into_inner()).await, "查询成功"))
}

// 修改草稿
pub async fn amend_draft(
    service: web::Data<AssignmentService>,
    path: web::Path<i64>,
    body: web::Json<AmendDraftRequest>,
) -> ActixResult<HttpResponse> {
    let result = service
        .amend_draft(path.into_inner(), body.into_inner())
        .await;
    Ok(respond(result, "草稿已更新"))
}

// 下发作业
pub async fn send_assignment(
    service: web::Data<AssignmentService>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    Ok(respond(service.send_assignment(path.into_inner()).await, "作业已下发"))
}

// 批改作业
pub async fn review_assignment(
    service: web::Data<AssignmentService>,
    path: web::Path<i64>,
    body: web::Json<ReviewAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    let result = service
        .review_assignment(path.into_inner(), body.into_inner())
        .await;
    Ok(respond(result, "作业已批改"))
}

// 回写自动评分
pub async fn record_auto_score(
    service: web::Data<AssignmentService>,
    path: web::Path<i64>,
    body: web::Json<AutoScoreRequest>,
) -> ActixResult<HttpResponse> {
    let result = service
        .record_auto_score(path.into_inner(), body.score)
        .await;
    Ok(respond(result, "自动评分已记录"))
}

// 修改教师评语
pub async fn update_teacher_comment(
    service: web::Data<AssignmentService>,
    path: web::Path<i64>,
    body: web::Json<TeacherCommentRequest>,
) -> ActixResult<HttpResponse> {
    let result = service
        .update_teacher_comment(path.into_inner(), body.into_inner().comment)
        .await;
    Ok(respond(result, "评语已更新"))
}

// 配置路由
pub fn configure_assignments_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/assignments")
            .service(
                web::resource("")
                    .route(web::get().to(list_assignments))
                    .route(web::post().to(create_assignment)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_assignment))
                    // 仅草稿可修改
                    .route(web::put().to(amend_draft)),
            )
            .service(web::resource("/{id}/send").route(web::post().to(send_assignment)))
            .service(web::resource("/{id}/review").route(web::post().to(review_assignment)))
            .service(web::resource("/{id}/auto-score").route(web::post().to(record_auto_score)))
            .service(web::resource("/{id}/comment").route(web::put().to(update_teacher_comment))),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory_storage::MemoryStorage;
    use crate::utils::json_error_handler;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};
    use std::sync::Arc;

    macro_rules! test_app {
        () => {{
            let service = AssignmentService::new(Arc::new(MemoryStorage::new()));
            test::init_service(
                App::new()
                    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                    .app_data(web::Data::new(service))
                    .configure(configure_assignments_routes),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn test_create_send_and_resend() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/api/v1/assignments")
            .set_json(json!({
                "teacher_id": 1,
                "student_id": 2,
                "content": { "text": "Sight reading", "attachments": [] },
                "deadline_at": "2026-05-01T12:00:00Z"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 0);
        assert_eq!(body["data"]["status"], "DRAFT");
        let id = body["data"]["id"].as_i64().unwrap();

        let send = || {
            test::TestRequest::post()
                .uri(&format!("/api/v1/assignments/{id}/send"))
                .to_request()
        };
        let resp = test::call_service(&app, send()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = test::call_service(&app, send()).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 2010);
    }

    #[actix_web::test]
    async fn test_error_status_mapping() {
        let app = test_app!();

        let req = test::TestRequest::get()
            .uri("/api/v1/assignments/999")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri("/api/v1/assignments")
            .set_json(json!({
                "teacher_id": 1,
                "student_id": 2,
                "content": { "text": "   " }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/v1/assignments")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 1000);
    }
}

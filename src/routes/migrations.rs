use actix_web::{HttpResponse, Result as ActixResult, web};

use crate::models::legacy::requests::LegacyMigrationRequest;
use crate::routes::respond;
use crate::services::LegacyMigrationService;

// 手动触发旧作业迁移，可从指定游标续跑
pub async fn migrate_legacy_homeworks(
    migration: web::Data<LegacyMigrationService>,
    body: web::Json<LegacyMigrationRequest>,
) -> ActixResult<HttpResponse> {
    let req = body.into_inner();
    let result = migration
        .run(req.cursor, req.dry_run.unwrap_or(false))
        .await;
    Ok(respond(result, "旧作业迁移完成"))
}

pub fn configure_migrations_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/migrations")
            .service(
                web::resource("/legacy-homeworks").route(web::post().to(migrate_legacy_homeworks)),
            ),
    );
}

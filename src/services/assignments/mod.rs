pub mod content;
pub mod create;
pub mod score;
pub mod transitions;
pub mod updates;

use std::sync::Arc;

use crate::errors::{HWSystemError, Result};
use crate::models::assignments::{
    entities::Assignment,
    requests::{AmendDraftRequest, CreateAssignmentRequest, ReviewAssignmentRequest},
    responses::AssignmentPage,
};
use crate::storage::AssignmentStore;

/// 作业生命周期控制
///
/// 每个写操作都基于同一次读取得到的版本号，并发修改以 `Conflict` 返回。
#[derive(Clone)]
pub struct AssignmentService {
    storage: Arc<dyn AssignmentStore>,
}

impl AssignmentService {
    pub fn new(storage: Arc<dyn AssignmentStore>) -> Self {
        Self { storage }
    }

    pub(crate) async fn load(&self, id: i64) -> Result<Assignment> {
        self.storage
            .get_assignment_by_id(id)
            .await?
            .ok_or_else(|| HWSystemError::not_found(format!("作业不存在: {id}")))
    }

    pub async fn create_assignment(&self, req: CreateAssignmentRequest) -> Result<Assignment> {
        create::create_assignment(self, req).await
    }

    pub async fn send_assignment(&self, id: i64) -> Result<Assignment> {
        transitions::send_assignment(self, id).await
    }

    pub async fn review_assignment(
        &self,
        id: i64,
        req: ReviewAssignmentRequest,
    ) -> Result<Assignment> {
        transitions::review_assignment(self, id, req).await
    }

    pub async fn amend_draft(&self, id: i64, req: AmendDraftRequest) -> Result<Assignment> {
        updates::amend_draft(self, id, req).await
    }

    pub async fn record_auto_score(&self, id: i64, score: f64) -> Result<Assignment> {
        updates::record_auto_score(self, id, score).await
    }

    pub async fn update_teacher_comment(&self, id: i64, comment: String) -> Result<Assignment> {
        updates::update_teacher_comment(self, id, comment).await
    }

    pub async fn get_assignment(&self, id: i64) -> Result<Assignment> {
        self.load(id).await
    }

    pub async fn list_assignments(&self, cursor: Option<i64>, size: u64) -> Result<AssignmentPage> {
        self.storage.scan_assignments(cursor, size).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assignments::entities::{AssignmentStatus, ContentBlock, SendMode};
    use crate::models::assignments::requests::{AssignmentContent, AssignmentPatch};
    use crate::storage::memory_storage::MemoryStorage;
    use serde_json::json;

    fn service() -> (AssignmentService, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (AssignmentService::new(storage.clone()), storage)
    }

    fn create_request(text: Option<&str>) -> CreateAssignmentRequest {
        CreateAssignmentRequest {
            teacher_id: 10,
            student_id: 20,
            content: AssignmentContent {
                text: text.map(str::to_string),
                attachments: serde_json::Value::Null,
            },
            deadline_at: None,
            send_mode: None,
        }
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let (service, _) = service();

        let draft = service
            .create_assignment(create_request(Some("Practice scales")))
            .await
            .unwrap();
        assert_eq!(draft.status, AssignmentStatus::Draft);
        assert_eq!(draft.send_mode, SendMode::Manual);
        assert_eq!(draft.title, "Practice scales");
        assert!(draft.sent_at.is_none());

        let sent = service.send_assignment(draft.id).await.unwrap();
        assert_eq!(sent.status, AssignmentStatus::Sent);
        assert!(sent.sent_at.is_some());

        let scored = service.record_auto_score(sent.id, 60.0).await.unwrap();
        assert_eq!(scored.final_score, Some(60.0));

        let reviewed = service
            .review_assignment(
                sent.id,
                ReviewAssignmentRequest {
                    manual_score: Some(90.0),
                    teacher_comment: Some("  Good tempo ".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(reviewed.status, AssignmentStatus::Reviewed);
        assert_eq!(reviewed.final_score, Some(90.0));
        assert_eq!(reviewed.teacher_comment.as_deref(), Some("Good tempo"));
        assert!(reviewed.reviewed_at.is_some());
        assert_eq!(reviewed.sent_at, sent.sent_at);

        // 人工评分优先于后续的自动评分
        let rescored = service.record_auto_score(sent.id, 40.0).await.unwrap();
        assert_eq!(rescored.auto_score, Some(40.0));
        assert_eq!(rescored.final_score, Some(90.0));

        let commented = service
            .update_teacher_comment(sent.id, "Watch the dynamics".to_string())
            .await
            .unwrap();
        assert_eq!(commented.teacher_comment.as_deref(), Some("Watch the dynamics"));
    }

    #[tokio::test]
    async fn test_create_validation() {
        let (service, storage) = service();

        let err = service
            .create_assignment(create_request(Some("   ")))
            .await
            .unwrap_err();
        assert!(matches!(err, HWSystemError::Validation(_)));

        let mut bad_ids = create_request(Some("Read"));
        bad_ids.student_id = 0;
        let err = service.create_assignment(bad_ids).await.unwrap_err();
        assert!(matches!(err, HWSystemError::Validation(_)));

        assert_eq!(storage.assignment_count().await, 0);

        let mut with_media = create_request(None);
        with_media.content.attachments = json!([{ "url": "https://cdn/sheet.pdf" }]);
        with_media.send_mode = Some(SendMode::Auto);
        let created = service.create_assignment(with_media).await.unwrap();
        assert_eq!(created.send_mode, SendMode::Auto);
        assert_eq!(created.content_snapshot.len(), 1);
        assert!(matches!(created.content_snapshot[0], ContentBlock::Media { .. }));
    }

    #[tokio::test]
    async fn test_invalid_transitions() {
        let (service, _) = service();
        let draft = service
            .create_assignment(create_request(Some("Essay")))
            .await
            .unwrap();

        let err = service
            .review_assignment(draft.id, ReviewAssignmentRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HWSystemError::InvalidTransition(_)));

        let err = service.record_auto_score(draft.id, 10.0).await.unwrap_err();
        assert!(matches!(err, HWSystemError::InvalidTransition(_)));

        service.send_assignment(draft.id).await.unwrap();
        let err = service.send_assignment(draft.id).await.unwrap_err();
        assert!(matches!(err, HWSystemError::InvalidTransition(_)));

        let err = service
            .update_teacher_comment(draft.id, "early".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, HWSystemError::InvalidTransition(_)));

        let err = service
            .amend_draft(
                draft.id,
                AmendDraftRequest {
                    deadline_at: Some(chrono::Utc::now()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HWSystemError::InvalidTransition(_)));

        service
            .review_assignment(draft.id, ReviewAssignmentRequest::default())
            .await
            .unwrap();
        let err = service.send_assignment(draft.id).await.unwrap_err();
        assert!(matches!(err, HWSystemError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let (service, _) = service();
        let err = service.send_assignment(404).await.unwrap_err();
        assert!(matches!(err, HWSystemError::NotFound(_)));
        let err = service.get_assignment(404).await.unwrap_err();
        assert!(matches!(err, HWSystemError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_review_rejects_invalid_score() {
        let (service, _) = service();
        let draft = service
            .create_assignment(create_request(Some("Essay")))
            .await
            .unwrap();
        service.send_assignment(draft.id).await.unwrap();

        let err = service
            .review_assignment(
                draft.id,
                ReviewAssignmentRequest {
                    manual_score: Some(-3.0),
                    teacher_comment: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HWSystemError::Validation(_)));

        let still_sent = service.get_assignment(draft.id).await.unwrap();
        assert_eq!(still_sent.status, AssignmentStatus::Sent);
    }

    #[tokio::test]
    async fn test_amend_draft_rebuilds_snapshot() {
        let (service, _) = service();
        let draft = service
            .create_assignment(create_request(Some("Old text")))
            .await
            .unwrap();

        let deadline = chrono::Utc::now() + chrono::Duration::days(2);
        let amended = service
            .amend_draft(
                draft.id,
                AmendDraftRequest {
                    content: Some(AssignmentContent {
                        text: Some("New   text".to_string()),
                        attachments: json!([{ "id": "a", "url": "https://cdn/a.mp3" }]),
                    }),
                    deadline_at: Some(deadline),
                },
            )
            .await
            .unwrap();

        assert_eq!(amended.title, "New text");
        assert_eq!(amended.deadline_at, Some(deadline));
        assert_eq!(amended.content_snapshot.len(), 2);
        assert_eq!(amended.version, draft.version + 1);

        let err = service
            .amend_draft(draft.id, AmendDraftRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HWSystemError::Validation(_)));
    }

    #[tokio::test]
    async fn test_stale_version_surfaces_conflict() {
        let (service, storage) = service();
        let draft = service
            .create_assignment(create_request(Some("Essay")))
            .await
            .unwrap();

        // 模拟另一个写入者先完成了更新
        storage
            .update_assignment(
                draft.id,
                draft.version,
                AssignmentPatch {
                    title: Some("Concurrent".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = storage
            .update_assignment(draft.id, draft.version, AssignmentPatch::default())
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        // 服务层每次重新读取版本，不受影响
        let sent = service.send_assignment(draft.id).await.unwrap();
        assert_eq!(sent.title, "Concurrent");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_transitions_have_one_winner() {
        let (service, _storage) = service();

        for _ in 0..50 {
            let draft = service
                .create_assignment(create_request(Some("Sight reading")))
                .await
                .unwrap();
            let id = draft.id;

            let (a, b) = (service.clone(), service.clone());
            let (first, second) = tokio::join!(
                tokio::spawn(async move { a.send_assignment(id).await }),
                tokio::spawn(async move { b.send_assignment(id).await }),
            );
            let sends = [first.unwrap(), second.unwrap()];
            assert_eq!(sends.iter().filter(|r| r.is_ok()).count(), 1);
            assert!(sends.iter().filter_map(|r| r.as_ref().err()).all(|e| {
                matches!(e, HWSystemError::Conflict(_) | HWSystemError::InvalidTransition(_))
            }));

            let review = |score: f64| ReviewAssignmentRequest {
                manual_score: Some(score),
                teacher_comment: None,
            };
            let (a, b) = (service.clone(), service.clone());
            let (first, second) = tokio::join!(
                tokio::spawn(async move { a.review_assignment(id, review(70.0)).await }),
                tokio::spawn(async move { b.review_assignment(id, review(95.0)).await }),
            );
            let reviews = [first.unwrap(), second.unwrap()];
            assert_eq!(reviews.iter().filter(|r| r.is_ok()).count(), 1);

            let winner = reviews.iter().find_map(|r| r.as_ref().ok()).unwrap();
            let stored = service.get_assignment(id).await.unwrap();
            assert_eq!(stored.status, AssignmentStatus::Reviewed);
            assert_eq!(stored.final_score, winner.final_score);
            assert_eq!(stored.version, draft.version + 2);
        }
    }
}

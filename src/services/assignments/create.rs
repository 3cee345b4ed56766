use chrono::Utc;
use tracing::info;

use super::{AssignmentService, content};
use crate::errors::{HWSystemError, Result};
use crate::models::assignments::{
    entities::{Assignment, AssignmentStatus},
    requests::{CreateAssignmentRequest, NewAssignment},
};

pub async fn create_assignment(
    service: &AssignmentService,
    req: CreateAssignmentRequest,
) -> Result<Assignment> {
    if req.teacher_id <= 0 || req.student_id <= 0 {
        return Err(HWSystemError::validation("teacher_id 和 student_id 必须为正整数"));
    }

    let text = req.content.text.as_deref();
    if !content::has_usable_content(text, &req.content.attachments) {
        return Err(HWSystemError::validation("作业内容不能为空：需要文本或至少一个有效附件"));
    }

    let now = Utc::now();
    let new_assignment = NewAssignment {
        legacy_homework_id: None,
        teacher_id: req.teacher_id,
        student_id: req.student_id,
        title: content::derive_title(text),
        status: AssignmentStatus::Draft,
        send_mode: req.send_mode.unwrap_or_default(),
        deadline_at: req.deadline_at,
        content_snapshot: content::build_content_snapshot(text, &req.content.attachments),
        sent_at: None,
        reviewed_at: None,
        created_at: now,
        updated_at: now,
    };

    let assignment = service.storage.create_assignment(new_assignment).await?;
    info!(
        "作业已创建: id={}, teacher_id={}, student_id={}",
        assignment.id, assignment.teacher_id, assignment.student_id
    );

    Ok(assignment)
}

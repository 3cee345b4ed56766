//! 状态流转：DRAFT -> SENT -> REVIEWED

use chrono::Utc;
use tracing::info;

use super::{AssignmentService, score};
use crate::errors::{HWSystemError, Result};
use crate::models::assignments::{
    entities::{Assignment, AssignmentStatus},
    requests::{AssignmentPatch, ReviewAssignmentRequest},
};

pub async fn send_assignment(service: &AssignmentService, id: i64) -> Result<Assignment> {
    let current = service.load(id).await?;
    ensure_status(&current, &[AssignmentStatus::Draft], "下发")?;

    let patch = AssignmentPatch {
        status: Some(AssignmentStatus::Sent),
        sent_at: Some(Utc::now()),
        ..Default::default()
    };
    let assignment = service
        .storage
        .update_assignment(id, current.version, patch)
        .await?;
    info!("作业已下发: id={}, student_id={}", id, assignment.student_id);

    Ok(assignment)
}

pub async fn review_assignment(
    service: &AssignmentService,
    id: i64,
    req: ReviewAssignmentRequest,
) -> Result<Assignment> {
    let current = service.load(id).await?;
    ensure_status(&current, &[AssignmentStatus::Sent], "批改")?;

    let manual_score = req
        .manual_score
        .map(|s| score::validate_score("manual_score", s))
        .transpose()?;
    let teacher_comment = req
        .teacher_comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let patch = AssignmentPatch {
        status: Some(AssignmentStatus::Reviewed),
        reviewed_at: Some(Utc::now()),
        manual_score,
        final_score: score::resolve(current.auto_score, manual_score),
        teacher_comment,
        ..Default::default()
    };
    let assignment = service
        .storage
        .update_assignment(id, current.version, patch)
        .await?;
    info!(
        "作业已批改: id={}, final_score={:?}",
        id, assignment.final_score
    );

    Ok(assignment)
}

/// 校验当前状态是否允许执行该动作
pub(super) fn ensure_status(
    assignment: &Assignment,
    allowed: &[AssignmentStatus],
    action: &str,
) -> Result<()> {
    if allowed.contains(&assignment.status) {
        return Ok(());
    }

    let allowed = allowed
        .iter()
        .map(AssignmentStatus::as_str)
        .collect::<Vec<_>>()
        .join(" / ");
    Err(HWSystemError::invalid_transition(format!(
        "作业 {} 当前状态为 {}，无法{}（需要 {}）",
        assignment.id, assignment.status, action, allowed
    )))
}

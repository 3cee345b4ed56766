//! 状态内的字段修改：草稿内容、自动评分、教师评语

use tracing::info;

use super::transitions::ensure_status;
use super::{AssignmentService, content, score};
use crate::errors::{HWSystemError, Result};
use crate::models::assignments::{
    entities::{Assignment, AssignmentStatus},
    requests::{AmendDraftRequest, AssignmentPatch},
};

pub async fn amend_draft(
    service: &AssignmentService,
    id: i64,
    req: AmendDraftRequest,
) -> Result<Assignment> {
    if req.content.is_none() && req.deadline_at.is_none() {
        return Err(HWSystemError::validation("没有需要更新的字段"));
    }

    let current = service.load(id).await?;
    ensure_status(&current, &[AssignmentStatus::Draft], "修改内容")?;

    let mut patch = AssignmentPatch {
        deadline_at: req.deadline_at,
        ..Default::default()
    };

    if let Some(new_content) = req.content {
        let text = new_content.text.as_deref();
        if !content::has_usable_content(text, &new_content.attachments) {
            return Err(HWSystemError::validation(
                "作业内容不能为空：需要文本或至少一个有效附件",
            ));
        }
        patch.title = Some(content::derive_title(text));
        patch.content_snapshot = Some(content::build_content_snapshot(
            text,
            &new_content.attachments,
        ));
    }

    let assignment = service
        .storage
        .update_assignment(id, current.version, patch)
        .await?;
    info!("草稿已修改: id={}", id);

    Ok(assignment)
}

pub async fn record_auto_score(
    service: &AssignmentService,
    id: i64,
    auto_score: f64,
) -> Result<Assignment> {
    let auto_score = score::validate_score("auto_score", auto_score)?;

    let current = service.load(id).await?;
    ensure_status(
        &current,
        &[AssignmentStatus::Sent, AssignmentStatus::Reviewed],
        "记录自动评分",
    )?;

    let patch = AssignmentPatch {
        auto_score: Some(auto_score),
        final_score: score::resolve(Some(auto_score), current.manual_score),
        ..Default::default()
    };

    service
        .storage
        .update_assignment(id, current.version, patch)
        .await
}

pub async fn update_teacher_comment(
    service: &AssignmentService,
    id: i64,
    comment: String,
) -> Result<Assignment> {
    let comment = comment.trim();
    if comment.is_empty() {
        return Err(HWSystemError::validation("评语不能为空"));
    }

    let current = service.load(id).await?;
    ensure_status(&current, &[AssignmentStatus::Reviewed], "修改评语")?;

    let patch = AssignmentPatch {
        teacher_comment: Some(comment.to_string()),
        ..Default::default()
    };

    service
        .storage
        .update_assignment(id, current.version, patch)
        .await
}

use crate::models::common::pagination::CursorPage;
use crate::models::assignments::entities::Assignment;

/// 作业游标分页结果
pub type AssignmentPage = CursorPage<Assignment>;

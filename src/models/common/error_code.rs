use crate::errors::HWSystemError;

// 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,
    BadRequest = 1000,
    ValidationFailed = 1001,
    AssignmentNotFound = 2004,
    AssignmentConflict = 2009,
    InvalidTransition = 2010,
    ReminderDispatchFailed = 3001,
    InternalServerError = 5000,
}

impl From<&HWSystemError> for ErrorCode {
    fn from(err: &HWSystemError) -> Self {
        match err {
            HWSystemError::Validation(_) => ErrorCode::ValidationFailed,
            HWSystemError::NotFound(_) => ErrorCode::AssignmentNotFound,
            HWSystemError::Conflict(_) => ErrorCode::AssignmentConflict,
            HWSystemError::InvalidTransition(_) => ErrorCode::InvalidTransition,
            HWSystemError::Dispatch(_) => ErrorCode::ReminderDispatchFailed,
            _ => ErrorCode::InternalServerError,
        }
    }
}

//! 最终得分计算

use crate::errors::{HWSystemError, Result};

/// 计算最终得分：人工评分优先，其次自动评分，都没有则为空
pub fn resolve(auto_score: Option<f64>, manual_score: Option<f64>) -> Option<f64> {
    manual_score.or(auto_score)
}

/// 校验分数：必须是有限的非负数
pub fn validate_score(field: &str, score: f64) -> Result<f64> {
    if !score.is_finite() || score < 0.0 {
        return Err(HWSystemError::validation(format!(
            "{field} 必须是非负有限数值，收到: {score}"
        )));
    }
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_manual() {
        assert_eq!(resolve(Some(70.0), Some(85.0)), Some(85.0));
        assert_eq!(resolve(None, Some(85.0)), Some(85.0));
        assert_eq!(resolve(Some(70.0), None), Some(70.0));
        assert_eq!(resolve(None, None), None);
        assert_eq!(resolve(Some(70.0), Some(0.0)), Some(0.0));
    }

    #[test]
    fn test_validate_score() {
        assert_eq!(validate_score("manual_score", 0.0).unwrap(), 0.0);
        assert_eq!(validate_score("manual_score", 99.5).unwrap(), 99.5);

        for bad in [-1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = validate_score("manual_score", bad).unwrap_err();
            assert!(matches!(err, HWSystemError::Validation(_)));
        }
    }
}

pub mod eligibility;
pub mod health;
pub mod matching;
pub mod pagination;
pub mod reconciliation;

use crate::error::ApiError;

/// DB に問い合わせる前に ID の範囲だけ弾く
pub(crate) fn require_id(field: &str, value: i64) -> Result<i64, ApiError> {
    if value <= 0 {
        return Err(ApiError::BadRequest(format!("{field} must be positive")));
    }
    Ok(value)
}

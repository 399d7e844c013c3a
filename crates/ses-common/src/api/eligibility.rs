use serde::Serialize;

use crate::tier::{tier_within_limit, SubcontractingTierLimit, Tier};

/// 商流チェック結果（違反時はエラーレスポンスになるため、ここに来るのは適格のみ）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibilityResponse {
    pub project_id: i64,
    pub engineer_id: i64,
    pub eligible: bool,
    pub tier: Tier,
    pub tier_label: &'static str,
    pub limit: Option<SubcontractingTierLimit>,
    pub limit_label: &'static str,
}

impl EligibilityResponse {
    pub fn new(
        project_id: i64,
        engineer_id: i64,
        tier: Tier,
        limit: Option<SubcontractingTierLimit>,
    ) -> Self {
        Self {
            project_id,
            engineer_id,
            eligible: tier_within_limit(tier, limit),
            tier,
            tier_label: tier.label(),
            limit,
            limit_label: limit
                .unwrap_or(SubcontractingTierLimit::NoRestriction)
                .label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_tier_as_depth_and_limit_as_snake_case() {
        let response = EligibilityResponse::new(
            1,
            2,
            Tier::FirstTier,
            Some(SubcontractingTierLimit::SecondTier),
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["eligible"], true);
        assert_eq!(json["tier"], 1);
        assert_eq!(json["limit"], "second_tier");
        assert_eq!(json["limit_label"], "二社先まで");
    }

    #[test]
    fn missing_limit_reads_as_no_restriction() {
        let response = EligibilityResponse::new(1, 2, Tier::SecondTier, None);
        assert!(response.eligible);
        assert_eq!(response.limit_label, "制限なし");
    }
}

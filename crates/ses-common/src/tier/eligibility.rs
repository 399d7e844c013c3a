use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};
use thiserror::Error;

use super::classifier::Tier;
use crate::{Engineer, Project};

/// 案件側の再委託制限（None と NoRestriction は同義）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubcontractingTierLimit {
    ProperOnly,
    FirstTier,
    SecondTier,
    NoRestriction,
}

impl SubcontractingTierLimit {
    /// 許容する最大 tier（制限なしは None）
    pub fn max_tier(self) -> Option<Tier> {
        match self {
            SubcontractingTierLimit::ProperOnly => Some(Tier::Proper),
            SubcontractingTierLimit::FirstTier => Some(Tier::FirstTier),
            SubcontractingTierLimit::SecondTier => Some(Tier::SecondTier),
            SubcontractingTierLimit::NoRestriction => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SubcontractingTierLimit::ProperOnly => "プロパーのみ",
            SubcontractingTierLimit::FirstTier => "一社先まで",
            SubcontractingTierLimit::SecondTier => "二社先まで",
            SubcontractingTierLimit::NoRestriction => "制限なし",
        }
    }
}

/// 商流制約違反。message は API レスポンスにそのまま載せる
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TierViolation {
    pub engineer_id: i64,
    pub project_id: i64,
    pub tier: Tier,
    pub limit: SubcontractingTierLimit,
    message: String,
}

impl TierViolation {
    fn new(engineer: &Engineer, project: &Project, tier: Tier, limit: SubcontractingTierLimit) -> Self {
        let message = format!(
            "商流制約違反: この案件は「{}」の制限がありますが、エンジニア「{}」は「{}」です",
            limit.label(),
            engineer.full_name,
            tier.label()
        );

        Self {
            engineer_id: engineer.id,
            project_id: project.id,
            tier,
            limit,
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn tier_within_limit(tier: Tier, limit: Option<SubcontractingTierLimit>) -> bool {
    match limit.and_then(SubcontractingTierLimit::max_tier) {
        Some(max) => tier <= max,
        None => true,
    }
}

/// エンジニアが案件の再委託制限を満たすか
pub fn is_eligible(engineer: &Engineer, project: &Project) -> bool {
    tier_within_limit(engineer.tier(), project.subcontracting_tier_limit)
}

/// 見積・発注作成前の事前チェック。違反時は TierViolation を返す
pub fn validate_eligibility(engineer: &Engineer, project: &Project) -> Result<(), TierViolation> {
    let tier = engineer.tier();

    match project.subcontracting_tier_limit {
        Some(limit) if !tier_within_limit(tier, Some(limit)) => {
            Err(TierViolation::new(engineer, project, tier, limit))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EmploymentType;

    const LIMITS_STRICT_TO_LOOSE: [Option<SubcontractingTierLimit>; 5] = [
        Some(SubcontractingTierLimit::ProperOnly),
        Some(SubcontractingTierLimit::FirstTier),
        Some(SubcontractingTierLimit::SecondTier),
        Some(SubcontractingTierLimit::NoRestriction),
        None,
    ];

    fn engineers() -> Vec<Engineer> {
        [
            (EmploymentType::Proper, None),
            (EmploymentType::FirstTierProper, Some(1)),
            (EmploymentType::Freelancer, None),
            (EmploymentType::Freelancer, Some(1)),
            (EmploymentType::FirstTierFreelancer, None),
        ]
        .into_iter()
        .enumerate()
        .map(|(idx, (employment_type, company_id))| Engineer {
            id: idx as i64 + 1,
            full_name: format!("エンジニア{}", idx + 1),
            employment_type,
            company_id,
            ..Engineer::default()
        })
        .collect()
    }

    fn project(limit: Option<SubcontractingTierLimit>) -> Project {
        Project {
            id: 10,
            subcontracting_tier_limit: limit,
            ..Project::default()
        }
    }

    #[test]
    fn thresholds_follow_limit() {
        let expected = [
            // proper_only, first_tier, second_tier, no_restriction, none
            [true, true, true, true, true],
            [false, true, true, true, true],
            [false, true, true, true, true],
            [false, false, true, true, true],
            [false, false, true, true, true],
        ];

        for (engineer, row) in engineers().iter().zip(expected) {
            for (limit, want) in LIMITS_STRICT_TO_LOOSE.iter().zip(row) {
                assert_eq!(
                    is_eligible(engineer, &project(*limit)),
                    want,
                    "{:?} under {limit:?}",
                    engineer.employment_type
                );
            }
        }
    }

    #[test]
    fn eligibility_is_monotonic_in_strictness() {
        for engineer in engineers() {
            let verdicts: Vec<bool> = LIMITS_STRICT_TO_LOOSE
                .iter()
                .map(|limit| is_eligible(&engineer, &project(*limit)))
                .collect();

            for pair in verdicts.windows(2) {
                assert!(!pair[0] || pair[1], "{verdicts:?}");
            }
        }
    }

    #[test]
    fn absent_limit_matches_no_restriction() {
        for engineer in engineers() {
            assert_eq!(
                is_eligible(&engineer, &project(None)),
                is_eligible(&engineer, &project(Some(SubcontractingTierLimit::NoRestriction)))
            );
        }
    }

    #[test]
    fn violation_names_labels_not_enum_values() {
        let engineer = Engineer {
            id: 4,
            full_name: "山田太郎".into(),
            employment_type: EmploymentType::Freelancer,
            company_id: Some(9),
            ..Engineer::default()
        };

        let err = validate_eligibility(
            &engineer,
            &project(Some(SubcontractingTierLimit::FirstTier)),
        )
        .unwrap_err();

        assert_eq!(err.tier, Tier::SecondTier);
        assert_eq!(err.limit, SubcontractingTierLimit::FirstTier);
        assert!(err.message().contains("一社先まで"));
        assert!(err.message().contains("二社先（パートナー企業経由/一社先個人事業主）"));
        assert!(err.message().contains("山田太郎"));
        assert!(!err.message().contains("first_tier"));
        assert_eq!(err.to_string(), err.message());
    }

    #[test]
    fn validation_passes_when_eligible() {
        let engineer = Engineer::default();
        assert!(validate_eligibility(
            &engineer,
            &project(Some(SubcontractingTierLimit::ProperOnly))
        )
        .is_ok());
        assert!(validate_eligibility(&engineer, &project(None)).is_ok());
    }
}

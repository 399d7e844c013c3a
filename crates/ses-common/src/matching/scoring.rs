use std::collections::HashSet;

use serde::Serialize;

use super::weights::{MatchWeights, MATCH_WEIGHTS};
use crate::{tier::is_eligible, AvailabilityStatus, Engineer, Project};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchScore {
    /// 総合スコア（0.0〜1.0）。商流不適格なら常に 0.0
    pub score: f64,
    pub skill_match_rate: f64,
    pub rate_match: bool,
    pub availability_match: bool,
    pub tier_eligible: bool,
}

/// 案件とエンジニアの適合スコア（既定の重み）
pub fn score_match(project: &Project, engineer: &Engineer) -> MatchScore {
    score_match_with(project, engineer, &MATCH_WEIGHTS)
}

pub fn score_match_with(project: &Project, engineer: &Engineer, weights: &MatchWeights) -> MatchScore {
    let skill_match_rate = skill_match_rate(&project.required_skills, &engineer.skills);
    let rate_match = rate_match(project.budget, engineer.monthly_rate);
    let availability_match = engineer.availability_status == AvailabilityStatus::Available;
    let tier_eligible = is_eligible(engineer, project);

    // 商流不適格は減点ではなく拒否
    let score = if tier_eligible {
        skill_match_rate * weights.skills
            + flag(rate_match) * weights.rate
            + flag(availability_match) * weights.availability
    } else {
        0.0
    };

    MatchScore {
        score,
        skill_match_rate,
        rate_match,
        availability_match,
        tier_eligible,
    }
}

/// 必須スキルの充足率。必須スキルが空なら 0.0（満点扱いしない）
fn skill_match_rate(required: &HashSet<i64>, possessed: &HashSet<i64>) -> f64 {
    if required.is_empty() {
        return 0.0;
    }

    let matched = required.intersection(possessed).count();
    matched as f64 / required.len() as f64
}

/// 単価・予算のどちらかが不明なら不一致
fn rate_match(budget: Option<i64>, monthly_rate: Option<i64>) -> bool {
    matches!((budget, monthly_rate), (Some(budget), Some(rate)) if rate <= budget)
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EmploymentType, SubcontractingTierLimit};

    fn base_project() -> Project {
        Project {
            id: 1,
            name: "基幹刷新".into(),
            budget: Some(800_000),
            required_skills: [1, 2, 3, 4].into_iter().collect(),
            ..Project::default()
        }
    }

    fn base_engineer() -> Engineer {
        Engineer {
            id: 1,
            full_name: "佐藤花子".into(),
            monthly_rate: Some(700_000),
            skills: [1, 2, 9].into_iter().collect(),
            is_active: true,
            ..Engineer::default()
        }
    }

    #[test]
    fn combines_signals_with_weights() {
        let result = score_match(&base_project(), &base_engineer());

        assert!((result.skill_match_rate - 0.5).abs() < 1e-9);
        assert!(result.rate_match);
        assert!(result.availability_match);
        assert!(result.tier_eligible);
        assert!((result.score - 0.75).abs() < 1e-9);
    }

    #[test]
    fn empty_requirement_gives_zero_skill_credit() {
        let mut project = base_project();
        project.required_skills.clear();

        let result = score_match(&project, &base_engineer());
        assert_eq!(result.skill_match_rate, 0.0);
        assert!((result.score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn missing_budget_or_rate_is_not_a_match() {
        let mut project = base_project();
        project.budget = None;
        assert!(!score_match(&project, &base_engineer()).rate_match);

        let mut engineer = base_engineer();
        engineer.monthly_rate = None;
        assert!(!score_match(&base_project(), &engineer).rate_match);

        engineer.monthly_rate = Some(800_000);
        assert!(score_match(&base_project(), &engineer).rate_match);

        engineer.monthly_rate = Some(800_001);
        assert!(!score_match(&base_project(), &engineer).rate_match);
    }

    #[test]
    fn unavailable_engineer_loses_availability_share() {
        let mut engineer = base_engineer();
        engineer.availability_status = AvailabilityStatus::Assigned;

        let result = score_match(&base_project(), &engineer);
        assert!(!result.availability_match);
        assert!((result.score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn tier_ineligible_engineer_always_scores_zero() {
        let mut project = base_project();
        project.subcontracting_tier_limit = Some(SubcontractingTierLimit::ProperOnly);

        let mut engineer = base_engineer();
        engineer.employment_type = EmploymentType::FirstTierFreelancer;
        engineer.skills = project.required_skills.clone();

        let result = score_match(&project, &engineer);
        assert!(!result.tier_eligible);
        assert_eq!(result.score, 0.0);
        // 他のシグナルは値として残す
        assert_eq!(result.skill_match_rate, 1.0);
        assert!(result.rate_match);
        assert!(result.availability_match);
    }

    #[test]
    fn score_stays_within_unit_range() {
        let mut engineer = base_engineer();
        engineer.skills = base_project().required_skills.clone();
        let result = score_match(&base_project(), &engineer);
        assert!((result.score - 1.0).abs() < 1e-9);

        engineer.skills.clear();
        engineer.monthly_rate = None;
        engineer.availability_status = AvailabilityStatus::Unavailable;
        let result = score_match(&base_project(), &engineer);
        assert_eq!(result.score, 0.0);
    }
}

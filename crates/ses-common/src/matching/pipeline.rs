use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::scoring::{score_match_with, MatchScore};
use super::weights::{MatchWeights, MATCH_WEIGHTS};
use crate::{Engineer, Project};

/// 1 回のマッチング実行で案件×エンジニアごとに 1 行生成される結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingResult {
    pub project_id: i64,
    pub engineer_id: i64,
    pub score: f64,
    pub skill_match_rate: f64,
    pub rate_match: bool,
    pub availability_match: bool,
    pub tier_eligible: bool,
}

impl MatchingResult {
    fn from_score(project_id: i64, engineer_id: i64, score: MatchScore) -> Self {
        Self {
            project_id,
            engineer_id,
            score: score.score,
            skill_match_rate: score.skill_match_rate,
            rate_match: score.rate_match,
            availability_match: score.availability_match,
            tier_eligible: score.tier_eligible,
        }
    }
}

/// 稼働中のエンジニア全員を案件に対してスコアリングし、スコア降順に並べる
///
/// 同点は入力順を維持する（安定ソート、二次キーなし）。
pub fn run_matching(project: &Project, engineers: &[Engineer]) -> Vec<MatchingResult> {
    run_matching_with(project, engineers, &MATCH_WEIGHTS)
}

pub fn run_matching_with(
    project: &Project,
    engineers: &[Engineer],
    weights: &MatchWeights,
) -> Vec<MatchingResult> {
    let mut results: Vec<MatchingResult> = engineers
        .iter()
        .filter(|engineer| engineer.is_active)
        .map(|engineer| {
            let score = score_match_with(project, engineer, weights);
            MatchingResult::from_score(project.id, engineer.id, score)
        })
        .collect();

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    results
}

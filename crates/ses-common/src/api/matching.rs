use serde::{Deserialize, Serialize};

use crate::db::StoredMatchingResult;
use crate::matching::MatchingResult;

/// マッチング実行リクエスト
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingRunRequest {
    pub project_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchingRunResponse {
    pub message: String,
    pub project_id: i64,
    /// スコア降順
    pub results: Vec<MatchingResult>,
}

impl MatchingRunResponse {
    pub fn new(project_id: i64, results: Vec<MatchingResult>) -> Self {
        let message = if results.is_empty() {
            "対象エンジニアが見つかりません".to_string()
        } else {
            format!("{}件のマッチング結果を生成しました", results.len())
        };

        Self {
            message,
            project_id,
            results,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchingResultsPage {
    pub project_id: i64,
    pub items: Vec<StoredMatchingResult>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(engineer_id: i64, score: f64) -> MatchingResult {
        MatchingResult {
            project_id: 1,
            engineer_id,
            score,
            skill_match_rate: score,
            rate_match: true,
            availability_match: true,
            tier_eligible: true,
        }
    }

    #[test]
    fn message_counts_generated_results() {
        let response = MatchingRunResponse::new(1, vec![result(1, 0.9), result(2, 0.4)]);
        assert_eq!(response.message, "2件のマッチング結果を生成しました");
    }

    #[test]
    fn empty_pool_has_its_own_message() {
        let response = MatchingRunResponse::new(1, Vec::new());
        assert_eq!(response.message, "対象エンジニアが見つかりません");
        assert!(response.results.is_empty());
    }

    #[test]
    fn request_requires_project_id() {
        assert!(serde_json::from_str::<MatchingRunRequest>("{}").is_err());
        let request: MatchingRunRequest = serde_json::from_str(r#"{"project_id": 3}"#).unwrap();
        assert_eq!(request.project_id, 3);
    }
}

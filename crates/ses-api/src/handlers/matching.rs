use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use ses_common::api::{MatchingResultsPage, MatchingRunRequest, MatchingRunResponse};
use ses_common::db::{
    fetch_active_engineers, fetch_project, list_matching_results, replace_matching_results,
};
use ses_common::matching::run_matching;

use super::pagination::{validate_pagination, DEFAULT_LIMIT};
use super::require_id;
use crate::auth::ApiKeyAuth;
use crate::error::ApiError;
use crate::SharedState;

#[derive(Debug, Deserialize)]
pub struct ResultsQuery {
    pub project_id: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

const fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

/// 案件に対して稼働中エンジニア全員をスコアリングし、前回結果を置き換える
pub async fn run(
    State(state): State<SharedState>,
    _auth: ApiKeyAuth,
    Json(request): Json<MatchingRunRequest>,
) -> Result<Json<MatchingRunResponse>, ApiError> {
    let project_id = require_id("project_id", request.project_id)?;

    let project = fetch_project(&state.pool, project_id).await?;
    let engineers = fetch_active_engineers(&state.pool).await?;

    let results = run_matching(&project, &engineers);
    replace_matching_results(&state.pool, project.id, &results).await?;

    info!(
        project_id,
        engineers = engineers.len(),
        results = results.len(),
        "matching run finished"
    );

    Ok(Json(MatchingRunResponse::new(project.id, results)))
}

pub async fn list_results(
    State(state): State<SharedState>,
    _auth: ApiKeyAuth,
    Query(query): Query<ResultsQuery>,
) -> Result<Json<MatchingResultsPage>, ApiError> {
    let project_id = require_id("project_id", query.project_id)?;
    let (limit, offset) = validate_pagination(query.limit, query.offset)?;

    let (items, total) = list_matching_results(&state.pool, project_id, limit, offset).await?;

    Ok(Json(MatchingResultsPage {
        project_id,
        items,
        total,
        limit,
        offset,
    }))
}

use axum::{
    extract::{Path, State},
    Json,
};

use ses_common::api::EligibilityResponse;
use ses_common::db::{fetch_engineer, fetch_project};
use ses_common::tier::validate_eligibility;

use super::require_id;
use crate::auth::ApiKeyAuth;
use crate::error::ApiError;
use crate::SharedState;

/// 見積・発注作成前の商流チェック。違反は 400 tier_violation
pub async fn check(
    State(state): State<SharedState>,
    Path((project_id, engineer_id)): Path<(i64, i64)>,
    _auth: ApiKeyAuth,
) -> Result<Json<EligibilityResponse>, ApiError> {
    let project_id = require_id("project_id", project_id)?;
    let engineer_id = require_id("engineer_id", engineer_id)?;

    let project = fetch_project(&state.pool, project_id).await?;
    let engineer = fetch_engineer(&state.pool, engineer_id).await?;

    validate_eligibility(&engineer, &project)?;

    Ok(Json(EligibilityResponse::new(
        project.id,
        engineer.id,
        engineer.tier(),
        project.subcontracting_tier_limit,
    )))
}

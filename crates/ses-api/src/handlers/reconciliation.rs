use axum::{
    extract::{Path, State},
    Json,
};

use ses_common::api::{
    ConfirmResponse, ManualMatchRequest, PaymentActionResponse, ReconcileRunResponse,
};
use ses_common::db::{
    confirm_payment, fetch_summary, manual_match_payment, reconcile_unmatched_payments,
    unmatch_payment,
};
use ses_common::reconciliation::ReconciliationSummary;

use super::require_id;
use crate::auth::ApiKeyAuth;
use crate::error::ApiError;
use crate::SharedState;

/// 未消込の入金を自動消込する
pub async fn run_auto_match(
    State(state): State<SharedState>,
    _auth: ApiKeyAuth,
) -> Result<Json<ReconcileRunResponse>, ApiError> {
    let run = reconcile_unmatched_payments(&state.pool, &state.reconcile_config).await?;
    Ok(Json(ReconcileRunResponse::from(run)))
}

pub async fn summary(
    State(state): State<SharedState>,
    _auth: ApiKeyAuth,
) -> Result<Json<ReconciliationSummary>, ApiError> {
    Ok(Json(fetch_summary(&state.pool).await?))
}

pub async fn manual_match(
    State(state): State<SharedState>,
    Path(payment_id): Path<i64>,
    _auth: ApiKeyAuth,
    Json(request): Json<ManualMatchRequest>,
) -> Result<Json<PaymentActionResponse>, ApiError> {
    let payment_id = require_id("payment_id", payment_id)?;
    let invoice_id = require_id("invoice_id", request.invoice_id)?;

    let payment = manual_match_payment(&state.pool, payment_id, invoice_id).await?;
    Ok(Json(PaymentActionResponse::matched(&payment)))
}

pub async fn confirm(
    State(state): State<SharedState>,
    Path(payment_id): Path<i64>,
    _auth: ApiKeyAuth,
) -> Result<Json<ConfirmResponse>, ApiError> {
    let payment_id = require_id("payment_id", payment_id)?;

    let (payment, invoice) = confirm_payment(&state.pool, payment_id).await?;
    Ok(Json(ConfirmResponse::new(&payment, invoice)))
}

pub async fn unmatch(
    State(state): State<SharedState>,
    Path(payment_id): Path<i64>,
    _auth: ApiKeyAuth,
) -> Result<Json<PaymentActionResponse>, ApiError> {
    let payment_id = require_id("payment_id", payment_id)?;

    let payment = unmatch_payment(&state.pool, payment_id).await?;
    Ok(Json(PaymentActionResponse::unmatched(&payment)))
}

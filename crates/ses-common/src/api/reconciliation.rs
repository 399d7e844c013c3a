use serde::{Deserialize, Serialize};

use crate::db::ReconciliationRun;
use crate::reconciliation::MatchOutcome;
use crate::{Invoice, Payment, PaymentStatus};

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileRunResponse {
    pub message: String,
    pub results: Vec<MatchOutcome>,
}

impl From<ReconciliationRun> for ReconcileRunResponse {
    fn from(run: ReconciliationRun) -> Self {
        let message = if run.total == 0 {
            "未消込の入金データがありません".to_string()
        } else {
            format!("{}件中{}件をマッチングしました", run.total, run.matched)
        };

        Self {
            message,
            results: run.outcomes,
        }
    }
}

/// 手動消込リクエスト
#[derive(Debug, Clone, Deserialize)]
pub struct ManualMatchRequest {
    pub invoice_id: i64,
}

/// 手動消込・取消のレスポンス
#[derive(Debug, Clone, Serialize)]
pub struct PaymentActionResponse {
    pub message: &'static str,
    pub payment_id: i64,
    pub invoice_id: Option<i64>,
    pub status: PaymentStatus,
}

impl PaymentActionResponse {
    pub fn matched(payment: &Payment) -> Self {
        Self::from_payment("マッチングしました", payment)
    }

    pub fn unmatched(payment: &Payment) -> Self {
        Self::from_payment("マッチングを取り消しました", payment)
    }

    fn from_payment(message: &'static str, payment: &Payment) -> Self {
        Self {
            message,
            payment_id: payment.id,
            invoice_id: payment.invoice_id,
            status: payment.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmResponse {
    pub message: &'static str,
    pub payment_id: i64,
    pub status: PaymentStatus,
    pub invoice: Invoice,
}

impl ConfirmResponse {
    pub fn new(payment: &Payment, invoice: Invoice) -> Self {
        Self {
            message: "消込を確定しました",
            payment_id: payment.id,
            status: payment.status,
            invoice,
        }
    }
}

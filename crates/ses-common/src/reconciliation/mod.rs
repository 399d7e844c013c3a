pub mod lifecycle;
pub mod matcher;
pub mod normalize;
pub mod scoring;
pub mod similarity;
pub mod summary;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

pub use lifecycle::{confirm_match, linked_invoice_id, manual_match, unmatch, ReconciliationError};
pub use matcher::{auto_match, MatchOutcome, MatchOutcomeStatus, ReconcileConfig};
pub use normalize::normalize_company_name;
pub use scoring::{score_payment, ReconcileScore};
pub use similarity::{levenshtein_distance, similarity_ratio};
pub use summary::{summarize, ReconciliationSummary};

/// 入金ステータス（confirmed は終端）
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unmatched,
    Matched,
    Confirmed,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    /// 消込対象になるのは送付済み・期限超過のみ
    pub fn is_open(self) -> bool {
        matches!(self, InvoiceStatus::Sent | InvoiceStatus::Overdue)
    }
}

/// 銀行取込の入金レコード（金額は円）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub invoice_id: Option<i64>,
    pub payment_date: Option<NaiveDate>,
    pub amount: i64,
    pub payer_name: Option<String>,
    pub reference_number: Option<String>,
    pub bank_name: Option<String>,
    pub status: PaymentStatus,
    pub notes: Option<String>,
}

/// 請求書。client_company_name は Contract → Project → Company で解決済みのもの
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub invoice_number: String,
    pub total_amount: i64,
    pub status: InvoiceStatus,
    pub client_company_name: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
}

use serde::{Deserialize, Serialize};

use super::{Payment, PaymentStatus};

/// 消込サマリー（件数と金額）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    pub total_payments: i64,
    pub matched: i64,
    pub unmatched: i64,
    pub confirmed: i64,
    pub total_amount: i64,
    /// matched + confirmed の入金額
    pub matched_amount: i64,
}

impl ReconciliationSummary {
    /// ステータス別の件数・金額を加算する
    pub fn add(&mut self, status: PaymentStatus, count: i64, amount: i64) {
        self.total_payments += count;
        self.total_amount += amount;

        match status {
            PaymentStatus::Unmatched => self.unmatched += count,
            PaymentStatus::Matched => {
                self.matched += count;
                self.matched_amount += amount;
            }
            PaymentStatus::Confirmed => {
                self.confirmed += count;
                self.matched_amount += amount;
            }
        }
    }
}

pub fn summarize<'a>(payments: impl IntoIterator<Item = &'a Payment>) -> ReconciliationSummary {
    payments
        .into_iter()
        .fold(ReconciliationSummary::default(), |mut summary, payment| {
            summary.add(payment.status, 1, payment.amount);
            summary
        })
}

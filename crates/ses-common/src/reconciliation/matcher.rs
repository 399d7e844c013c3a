use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strum::AsRefStr;
use tracing::debug;

use super::scoring::score_payment;
use super::{Invoice, Payment, PaymentStatus};

pub const DEFAULT_MATCH_THRESHOLD: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// この点数以上で自動消込を確定する
    pub match_threshold: u32,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchOutcomeStatus {
    Matched,
    Unmatched,
    AlreadyMatched,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub payment_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    pub score: u32,
    pub status: MatchOutcomeStatus,
}

impl MatchOutcome {
    fn unmatched(payment_id: i64, score: u32) -> Self {
        Self {
            payment_id,
            invoice_id: None,
            invoice_number: None,
            score,
            status: MatchOutcomeStatus::Unmatched,
        }
    }
}

/// 未消込の入金を請求書に貪欲に割り当てる
///
/// 入金は入力順に処理し、まだ割り当てられていない請求書のうち最高点（同点なら先勝ち）を選ぶ。
/// 閾値以上なら確定し、その請求書は同じ実行内の後続の入金から除外する。
/// 後から来た入金の方が適していても付け替えはしない。
pub fn auto_match(
    payments: &[Payment],
    invoices: &[Invoice],
    config: &ReconcileConfig,
) -> Vec<MatchOutcome> {
    let mut claimed: HashSet<i64> = HashSet::new();
    let mut outcomes = Vec::with_capacity(payments.len());

    for payment in payments {
        if payment.status != PaymentStatus::Unmatched {
            outcomes.push(MatchOutcome {
                payment_id: payment.id,
                invoice_id: None,
                invoice_number: None,
                score: 0,
                status: MatchOutcomeStatus::AlreadyMatched,
            });
            continue;
        }

        let mut best: Option<&Invoice> = None;
        let mut best_score = 0;

        for invoice in invoices
            .iter()
            .filter(|invoice| invoice.status.is_open() && !claimed.contains(&invoice.id))
        {
            let score = score_payment(payment, invoice).total();
            if score > best_score {
                best_score = score;
                best = Some(invoice);
            }
        }

        match best {
            Some(invoice) if best_score >= config.match_threshold => {
                claimed.insert(invoice.id);
                debug!(
                    payment_id = payment.id,
                    invoice_id = invoice.id,
                    score = best_score,
                    "payment matched"
                );
                outcomes.push(MatchOutcome {
                    payment_id: payment.id,
                    invoice_id: Some(invoice.id),
                    invoice_number: Some(invoice.invoice_number.clone()),
                    score: best_score,
                    status: MatchOutcomeStatus::Matched,
                });
            }
            _ => {
                debug!(payment_id = payment.id, score = best_score, "payment left unmatched");
                outcomes.push(MatchOutcome::unmatched(payment.id, best_score));
            }
        }
    }

    outcomes
}

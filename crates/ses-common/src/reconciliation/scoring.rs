use serde::{Deserialize, Serialize};

use super::normalize::normalize_company_name;
use super::similarity::similarity_ratio;
use super::{Invoice, Payment};

pub const MAX_SCORE: u32 = 100;

const AMOUNT_EXACT: u32 = 50;
const AMOUNT_WITHIN_ONE_PERCENT: u32 = 30;

const NAME_FULL: u32 = 30;
const NAME_TOKEN: u32 = 15;
const NAME_FUZZY_HIGH: u32 = 20;
const NAME_FUZZY_LOW: u32 = 10;
const FUZZY_HIGH_RATIO: f64 = 0.7;
const FUZZY_LOW_RATIO: f64 = 0.5;

const REFERENCE_MATCH: u32 = 20;

/// 入金×請求書の照合スコア内訳（整数点）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileScore {
    pub amount: u32,
    pub payer_name: u32,
    pub reference: u32,
}

impl ReconcileScore {
    pub fn total(&self) -> u32 {
        (self.amount + self.payer_name + self.reference).min(MAX_SCORE)
    }
}

pub fn score_payment(payment: &Payment, invoice: &Invoice) -> ReconcileScore {
    ReconcileScore {
        amount: score_amount(payment.amount, invoice.total_amount),
        payer_name: score_payer_name(
            payment.payer_name.as_deref(),
            invoice.client_company_name.as_deref(),
        ),
        reference: score_reference(
            payment.reference_number.as_deref(),
            Some(invoice.invoice_number.as_str()),
        ),
    }
}

/// 完全一致 50 点、請求額の 1% 以内 30 点
fn score_amount(amount: i64, total: i64) -> u32 {
    if amount == total {
        return AMOUNT_EXACT;
    }

    let diff = amount.abs_diff(total);
    let within_one_percent = total >= 0 && u128::from(diff) * 100 <= total as u128;

    if within_one_percent {
        AMOUNT_WITHIN_ONE_PERCENT
    } else {
        0
    }
}

/// 振込名義と請求先会社名の照合（最大 30 点）
///
/// 部分一致で決まらなければ正規化後のあいまい比較に進み、高い方を採る。
/// 会社名が解決できない請求書は 0 点（エラーにしない）。
fn score_payer_name(payer_name: Option<&str>, company_name: Option<&str>) -> u32 {
    let (Some(payer), Some(company)) = (non_empty(payer_name), non_empty(company_name)) else {
        return 0;
    };

    let payer_upper = payer.to_uppercase();

    let mut score = if payer_upper.contains(company) || payer_upper.contains(&company.to_uppercase())
    {
        NAME_FULL
    } else if company.split_whitespace().any(|part| payer_upper.contains(part)) {
        NAME_TOKEN
    } else {
        0
    };

    if score < NAME_FULL {
        let norm_payer = normalize_company_name(payer);
        let norm_company = normalize_company_name(company);

        if !norm_payer.is_empty() && !norm_company.is_empty() {
            if norm_payer == norm_company {
                score = NAME_FULL;
            } else {
                let ratio = similarity_ratio(&norm_payer, &norm_company);
                if ratio >= FUZZY_HIGH_RATIO {
                    score = score.max(NAME_FUZZY_HIGH);
                } else if ratio >= FUZZY_LOW_RATIO {
                    score = score.max(NAME_FUZZY_LOW);
                }
            }
        }
    }

    score.min(NAME_FULL)
}

/// 参照番号と請求書番号のどちらかがもう一方を含めば 20 点
fn score_reference(reference: Option<&str>, invoice_number: Option<&str>) -> u32 {
    match (non_empty(reference), non_empty(invoice_number)) {
        (Some(reference), Some(number))
            if reference.contains(number) || number.contains(reference) =>
        {
            REFERENCE_MATCH
        }
        _ => 0,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

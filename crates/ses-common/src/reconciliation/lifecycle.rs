use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{Invoice, InvoiceStatus, Payment, PaymentStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconciliationError {
    #[error("マッチング先の請求書が設定されていません (payment {0})")]
    NoLinkedInvoice(i64),
    #[error("確定済みの消込は変更できません (payment {0})")]
    AlreadyConfirmed(i64),
    #[error("payment {payment_id} is linked to invoice {linked}, not {given}")]
    InvoiceMismatch {
        payment_id: i64,
        linked: i64,
        given: i64,
    },
}

/// 確定前に紐付け先の請求書 ID を取り出す
pub fn linked_invoice_id(payment: &Payment) -> Result<i64, ReconciliationError> {
    payment
        .invoice_id
        .ok_or(ReconciliationError::NoLinkedInvoice(payment.id))
}

/// 消込を確定し、請求書を入金済みにする
///
/// 確定済みの再確定はそのまま成功し、最初の paid_at を保持する。
pub fn confirm_match(
    payment: &mut Payment,
    invoice: &mut Invoice,
    confirmed_at: DateTime<Utc>,
) -> Result<(), ReconciliationError> {
    let linked = linked_invoice_id(payment)?;
    if linked != invoice.id {
        return Err(ReconciliationError::InvoiceMismatch {
            payment_id: payment.id,
            linked,
            given: invoice.id,
        });
    }

    payment.status = PaymentStatus::Confirmed;
    invoice.status = InvoiceStatus::Paid;
    invoice.paid_at.get_or_insert(confirmed_at);

    Ok(())
}

/// 紐付けを外して未消込に戻す。確定済みは戻せない
pub fn unmatch(payment: &mut Payment) -> Result<(), ReconciliationError> {
    if payment.status == PaymentStatus::Confirmed {
        return Err(ReconciliationError::AlreadyConfirmed(payment.id));
    }

    payment.invoice_id = None;
    payment.status = PaymentStatus::Unmatched;

    Ok(())
}

/// 手動で特定の請求書に紐付ける。確定済みは付け替えない
pub fn manual_match(payment: &mut Payment, invoice: &Invoice) -> Result<(), ReconciliationError> {
    if payment.status == PaymentStatus::Confirmed {
        return Err(ReconciliationError::AlreadyConfirmed(payment.id));
    }

    payment.invoice_id = Some(invoice.id);
    payment.status = PaymentStatus::Matched;

    Ok(())
}

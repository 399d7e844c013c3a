use std::str::FromStr;

use chrono::Utc;
use deadpool_postgres::GenericClient;
use tokio_postgres::Row;
use tracing::{info, instrument};

use crate::db::util::TimedClientExt;
use crate::db::PgPool;
use crate::reconciliation::{
    auto_match, confirm_match, linked_invoice_id, manual_match, unmatch, MatchOutcome,
    MatchOutcomeStatus, ReconcileConfig, ReconciliationError, ReconciliationSummary,
};
use crate::{Invoice, InvoiceStatus, Payment, PaymentStatus};

db_error!(ReconciliationStorageError {
    #[error("payment not found: {0}")]
    PaymentNotFound(i64),
    #[error("invoice not found: {0}")]
    InvoiceNotFound(i64),
    #[error("{0}")]
    Lifecycle(#[from] ReconciliationError),
    #[error("failed to map row: {0}")]
    Mapping(String),
});

/// 自動消込の実行を直列化するアドバイザリロックのキー
const RECONCILE_LOCK_KEY: i64 = 0x5E5_0001;

const PAYMENT_COLUMNS: &str = "SELECT \
        id,\
        invoice_id,\
        payment_date,\
        amount,\
        payer_name,\
        reference_number,\
        bank_name,\
        status,\
        notes \
    FROM ses.payments";

/// 自動消込 1 回分の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationRun {
    pub total: usize,
    pub matched: usize,
    pub outcomes: Vec<MatchOutcome>,
}

fn parse_status<T: FromStr>(column: &str, raw: &str) -> Result<T, ReconciliationStorageError> {
    T::from_str(raw).map_err(|_| ReconciliationStorageError::Mapping(format!("{column}={raw}")))
}

fn map_payment_row(row: &Row) -> Result<Payment, ReconciliationStorageError> {
    let status: String = row.get("status");
    Ok(Payment {
        id: row.get("id"),
        invoice_id: row.get("invoice_id"),
        payment_date: row.get("payment_date"),
        amount: row.get("amount"),
        payer_name: row.get("payer_name"),
        reference_number: row.get("reference_number"),
        bank_name: row.get("bank_name"),
        status: parse_status::<PaymentStatus>("payments.status", &status)?,
        notes: row.get("notes"),
    })
}

fn map_invoice_row(row: &Row) -> Result<Invoice, ReconciliationStorageError> {
    let status: String = row.get("status");
    Ok(Invoice {
        id: row.get("id"),
        invoice_number: row.get("invoice_number"),
        total_amount: row.get("total_amount"),
        status: parse_status::<InvoiceStatus>("invoices.status", &status)?,
        client_company_name: row.get("client_company_name"),
        paid_at: row.get("paid_at"),
    })
}

async fn lock_payment(
    client: &impl GenericClient,
    payment_id: i64,
) -> Result<Payment, ReconciliationStorageError> {
    let query = format!("{PAYMENT_COLUMNS} WHERE id = $1 FOR UPDATE");
    let row = client
        .timed_query_opt(query.as_str(), &[&payment_id], "lock_payment")
        .await?
        .ok_or(ReconciliationStorageError::PaymentNotFound(payment_id))?;
    map_payment_row(&row)
}

/// 確定処理用。会社名は使わないので結合しない
async fn lock_invoice(
    client: &impl GenericClient,
    invoice_id: i64,
) -> Result<Invoice, ReconciliationStorageError> {
    let row = client
        .timed_query_opt(
            "SELECT id, invoice_number, total_amount, status, NULL::TEXT AS client_company_name, paid_at \
             FROM ses.invoices WHERE id = $1 FOR UPDATE",
            &[&invoice_id],
            "lock_invoice",
        )
        .await?
        .ok_or(ReconciliationStorageError::InvoiceNotFound(invoice_id))?;
    map_invoice_row(&row)
}

async fn store_payment_link(
    client: &impl GenericClient,
    payment: &Payment,
) -> Result<(), ReconciliationStorageError> {
    let status: &str = payment.status.as_ref();
    client
        .timed_execute(
            "UPDATE ses.payments SET invoice_id = $2, status = $3, updated_at = NOW() WHERE id = $1",
            &[&payment.id, &payment.invoice_id, &status],
            "store_payment_link",
        )
        .await?;
    Ok(())
}

/// 更新件数を割り当て結果に反映する。0 件なら読み込み後に他の操作で紐付け済み
fn settle_auto_match(outcome: &mut MatchOutcome, rows_updated: u64) -> bool {
    if rows_updated > 0 {
        return true;
    }
    outcome.status = MatchOutcomeStatus::AlreadyMatched;
    outcome.invoice_id = None;
    outcome.invoice_number = None;
    false
}

/// 未消込の入金を消込対象の請求書に自動で割り当てる
///
/// 実行はアドバイザリロックで直列化し、未消込の入金はロック取得後に読み直す。
#[instrument(skip(pool, config), fields(threshold = config.match_threshold))]
pub async fn reconcile_unmatched_payments(
    pool: &PgPool,
    config: &ReconcileConfig,
) -> Result<ReconciliationRun, ReconciliationStorageError> {
    let mut client = pool.get().await?;
    let tx = client.transaction().await?;

    tx.timed_execute(
        "SELECT pg_advisory_xact_lock($1)",
        &[&RECONCILE_LOCK_KEY],
        "reconcile_lock",
    )
    .await?;

    let query = format!("{PAYMENT_COLUMNS} WHERE status = 'unmatched' ORDER BY id");
    let payments = tx
        .timed_query(query.as_str(), &[], "fetch_unmatched_payments")
        .await?
        .iter()
        .map(map_payment_row)
        .collect::<Result<Vec<_>, _>>()?;

    if payments.is_empty() {
        tx.commit().await?;
        return Ok(ReconciliationRun {
            total: 0,
            matched: 0,
            outcomes: Vec::new(),
        });
    }

    let invoices = tx
        .timed_query(
            "SELECT \
                i.id,\
                i.invoice_number,\
                i.total_amount,\
                i.status,\
                co.name AS client_company_name,\
                i.paid_at \
            FROM ses.invoices i \
            LEFT JOIN ses.contracts c ON c.id = i.contract_id \
            LEFT JOIN ses.projects p ON p.id = c.project_id \
            LEFT JOIN ses.companies co ON co.id = p.client_company_id \
            WHERE i.status IN ('sent', 'overdue') \
            ORDER BY i.id",
            &[],
            "fetch_open_invoices",
        )
        .await?
        .iter()
        .map(map_invoice_row)
        .collect::<Result<Vec<_>, _>>()?;

    let mut outcomes = auto_match(&payments, &invoices, config);

    let mut matched = 0;
    for outcome in outcomes
        .iter_mut()
        .filter(|outcome| outcome.status == MatchOutcomeStatus::Matched)
    {
        let updated = tx
            .timed_execute(
                "UPDATE ses.payments SET invoice_id = $2, status = 'matched', updated_at = NOW() \
                 WHERE id = $1 AND status = 'unmatched'",
                &[&outcome.payment_id, &outcome.invoice_id],
                "apply_auto_match",
            )
            .await?;
        if settle_auto_match(outcome, updated) {
            matched += 1;
        }
    }

    tx.commit().await?;

    info!(
        total = payments.len(),
        matched,
        invoices = invoices.len(),
        "reconciliation run finished"
    );

    Ok(ReconciliationRun {
        total: payments.len(),
        matched,
        outcomes,
    })
}

/// 消込を確定し、紐付け先の請求書を入金済みにする
#[instrument(skip(pool))]
pub async fn confirm_payment(
    pool: &PgPool,
    payment_id: i64,
) -> Result<(Payment, Invoice), ReconciliationStorageError> {
    let mut client = pool.get().await?;
    let tx = client.transaction().await?;

    let mut payment = lock_payment(&tx, payment_id).await?;
    let invoice_id = linked_invoice_id(&payment)?;
    let mut invoice = lock_invoice(&tx, invoice_id).await?;

    confirm_match(&mut payment, &mut invoice, Utc::now())?;

    store_payment_link(&tx, &payment).await?;
    let invoice_status: &str = invoice.status.as_ref();
    tx.timed_execute(
        "UPDATE ses.invoices SET status = $2, paid_at = $3, updated_at = NOW() WHERE id = $1",
        &[&invoice.id, &invoice_status, &invoice.paid_at],
        "mark_invoice_paid",
    )
    .await?;

    tx.commit().await?;

    info!(payment_id, invoice_id, "payment confirmed");
    Ok((payment, invoice))
}

/// 紐付けを外して未消込に戻す
#[instrument(skip(pool))]
pub async fn unmatch_payment(
    pool: &PgPool,
    payment_id: i64,
) -> Result<Payment, ReconciliationStorageError> {
    let mut client = pool.get().await?;
    let tx = client.transaction().await?;

    let mut payment = lock_payment(&tx, payment_id).await?;
    unmatch(&mut payment)?;
    store_payment_link(&tx, &payment).await?;

    tx.commit().await?;

    info!(payment_id, "payment unmatched");
    Ok(payment)
}

/// 入金を指定の請求書へ手動で紐付ける
#[instrument(skip(pool))]
pub async fn manual_match_payment(
    pool: &PgPool,
    payment_id: i64,
    invoice_id: i64,
) -> Result<Payment, ReconciliationStorageError> {
    let mut client = pool.get().await?;
    let tx = client.transaction().await?;

    let mut payment = lock_payment(&tx, payment_id).await?;
    let invoice = lock_invoice(&tx, invoice_id).await?;

    manual_match(&mut payment, &invoice)?;
    store_payment_link(&tx, &payment).await?;

    tx.commit().await?;

    info!(payment_id, invoice_id, "payment matched manually");
    Ok(payment)
}

#[instrument(skip(pool))]
pub async fn fetch_summary(pool: &PgPool) -> Result<ReconciliationSummary, ReconciliationStorageError> {
    let client = pool.get().await?;
    let rows = client
        .timed_query(
            "SELECT status, COUNT(*) AS payments, COALESCE(SUM(amount), 0)::BIGINT AS amount \
             FROM ses.payments GROUP BY status",
            &[],
            "fetch_reconciliation_summary",
        )
        .await?;

    let mut summary = ReconciliationSummary::default();
    for row in &rows {
        let status: String = row.get("status");
        summary.add(
            parse_status::<PaymentStatus>("payments.status", &status)?,
            row.get("payments"),
            row.get("amount"),
        );
    }

    Ok(summary)
}

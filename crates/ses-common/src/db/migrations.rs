use thiserror::Error;
use tracing::{info, instrument};

use crate::db::PgPool;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),
    #[error("failed to run migration: {0}")]
    Postgres(#[from] tokio_postgres::Error),
}

struct Migration {
    id: i32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        id: 1,
        description: "engineers, projects and skills",
        sql: r#"
CREATE TABLE IF NOT EXISTS ses.companies (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS ses.skill_tags (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS ses.engineers (
    id BIGSERIAL PRIMARY KEY,
    full_name TEXT NOT NULL,
    employment_type TEXT NOT NULL,
    company_id BIGINT REFERENCES ses.companies(id),
    monthly_rate BIGINT,
    availability_status TEXT NOT NULL DEFAULT 'available',
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT chk_engineer_employment_type CHECK (
        employment_type IN ('proper', 'first_tier_proper', 'freelancer', 'first_tier_freelancer')
    ),
    CONSTRAINT chk_engineer_availability CHECK (
        availability_status IN ('available', 'assigned', 'unavailable')
    ),
    CONSTRAINT chk_engineer_monthly_rate CHECK (monthly_rate IS NULL OR monthly_rate >= 0)
);

CREATE INDEX IF NOT EXISTS idx_engineers_active ON ses.engineers(id) WHERE is_active;

CREATE TABLE IF NOT EXISTS ses.engineer_skills (
    engineer_id BIGINT NOT NULL REFERENCES ses.engineers(id) ON DELETE CASCADE,
    skill_id BIGINT NOT NULL REFERENCES ses.skill_tags(id) ON DELETE CASCADE,
    PRIMARY KEY (engineer_id, skill_id)
);

CREATE TABLE IF NOT EXISTS ses.projects (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    client_company_id BIGINT REFERENCES ses.companies(id),
    subcontracting_tier_limit TEXT,
    budget BIGINT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT chk_project_tier_limit CHECK (
        subcontracting_tier_limit IS NULL
        OR subcontracting_tier_limit IN ('proper_only', 'first_tier', 'second_tier', 'no_restriction')
    ),
    CONSTRAINT chk_project_budget CHECK (budget IS NULL OR budget >= 0)
);

CREATE TABLE IF NOT EXISTS ses.project_required_skills (
    project_id BIGINT NOT NULL REFERENCES ses.projects(id) ON DELETE CASCADE,
    skill_id BIGINT NOT NULL REFERENCES ses.skill_tags(id) ON DELETE CASCADE,
    PRIMARY KEY (project_id, skill_id)
);
"#,
    },
    Migration {
        id: 2,
        description: "matching results",
        sql: r#"
CREATE TABLE IF NOT EXISTS ses.matching_results (
    id BIGSERIAL PRIMARY KEY,
    project_id BIGINT NOT NULL REFERENCES ses.projects(id) ON DELETE CASCADE,
    engineer_id BIGINT NOT NULL REFERENCES ses.engineers(id) ON DELETE CASCADE,
    score DOUBLE PRECISION NOT NULL,
    skill_match_rate DOUBLE PRECISION NOT NULL,
    rate_match BOOLEAN NOT NULL,
    availability_match BOOLEAN NOT NULL,
    tier_eligible BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT chk_matching_score_range CHECK (score >= 0.0 AND score <= 1.0),
    CONSTRAINT chk_matching_skill_rate_range CHECK (skill_match_rate >= 0.0 AND skill_match_rate <= 1.0),
    CONSTRAINT uq_matching_project_engineer UNIQUE (project_id, engineer_id)
);

CREATE INDEX IF NOT EXISTS idx_matching_results_project_score
    ON ses.matching_results(project_id, score DESC, id);
"#,
    },
    Migration {
        id: 3,
        description: "contracts, invoices and payments",
        sql: r#"
CREATE TABLE IF NOT EXISTS ses.contracts (
    id BIGSERIAL PRIMARY KEY,
    contract_number TEXT NOT NULL UNIQUE,
    engineer_id BIGINT NOT NULL REFERENCES ses.engineers(id),
    project_id BIGINT NOT NULL REFERENCES ses.projects(id),
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    monthly_rate BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT chk_contract_period CHECK (start_date <= end_date)
);

CREATE TABLE IF NOT EXISTS ses.invoices (
    id BIGSERIAL PRIMARY KEY,
    contract_id BIGINT NOT NULL REFERENCES ses.contracts(id),
    invoice_number TEXT NOT NULL UNIQUE,
    billing_month DATE NOT NULL,
    total_amount BIGINT NOT NULL,
    status TEXT NOT NULL DEFAULT 'draft',
    sent_at TIMESTAMPTZ,
    paid_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT chk_invoice_status CHECK (status IN ('draft', 'sent', 'paid', 'overdue'))
);

CREATE INDEX IF NOT EXISTS idx_invoices_open
    ON ses.invoices(id) WHERE status IN ('sent', 'overdue');

CREATE TABLE IF NOT EXISTS ses.payments (
    id BIGSERIAL PRIMARY KEY,
    invoice_id BIGINT REFERENCES ses.invoices(id),
    payment_date DATE NOT NULL,
    amount BIGINT NOT NULL,
    payer_name TEXT,
    reference_number TEXT,
    bank_name TEXT,
    status TEXT NOT NULL DEFAULT 'unmatched',
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT chk_payment_status CHECK (status IN ('unmatched', 'matched', 'confirmed')),
    CONSTRAINT chk_payment_link CHECK (status = 'unmatched' OR invoice_id IS NOT NULL)
);

CREATE INDEX IF NOT EXISTS idx_payments_unmatched
    ON ses.payments(id) WHERE status = 'unmatched';
"#,
    },
];

#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrationError> {
    let mut client = pool.get().await?;
    client
        .batch_execute(
            "CREATE SCHEMA IF NOT EXISTS ses;
             CREATE TABLE IF NOT EXISTS ses.schema_migrations (
                id INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
             );",
        )
        .await?;

    for migration in MIGRATIONS {
        let already_applied: bool = client
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM ses.schema_migrations WHERE id = $1)",
                &[&migration.id],
            )
            .await?
            .get(0);

        if already_applied {
            continue;
        }

        let tx = client.transaction().await?;
        tx.batch_execute(migration.sql).await?;
        tx.execute(
            "INSERT INTO ses.schema_migrations (id, description) VALUES ($1, $2)",
            &[&migration.id, &migration.description],
        )
        .await?;
        tx.commit().await?;

        info!(
            id = migration.id,
            description = migration.description,
            "applied migration"
        );
    }

    Ok(())
}

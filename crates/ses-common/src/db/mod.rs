/// Storage error enum with the shared `Pool` / `Postgres` variants plus per-module extras.
macro_rules! db_error {
    ($name:ident { $($extra:tt)* }) => {
        #[derive(Debug, thiserror::Error)]
        pub enum $name {
            #[error("failed to get postgres connection: {0}")]
            Pool(#[from] deadpool_postgres::PoolError),
            #[error("postgres error: {0}")]
            Postgres(#[from] tokio_postgres::Error),
            $($extra)*
        }
    };
}

pub mod engineers;
pub mod match_results;
pub mod migrations;
pub mod payments;
pub mod pool;
pub mod util;

pub use engineers::{
    fetch_active_engineers, fetch_engineer, fetch_project, MatchingStorageError,
};
pub use match_results::{
    list_matching_results, replace_matching_results, MatchResultStorageError, StoredMatchingResult,
};
pub use migrations::{run_migrations, MigrationError};
pub use payments::{
    confirm_payment, fetch_summary, manual_match_payment, reconcile_unmatched_payments,
    unmatch_payment, ReconciliationRun, ReconciliationStorageError,
};
pub use pool::{create_pool_from_url, create_pool_from_url_checked, DbPoolError, PgPool};

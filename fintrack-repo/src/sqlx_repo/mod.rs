mod account_repo;
mod tag_repo;
mod transaction_repo;

use crate::account_repo::AccountRepo;
use crate::error::LedgerRepoError;
use crate::tag_repo::TagRepo;
use crate::transaction_repo::TransactionRepo;
use crate::HealthCheck;
use anyhow::Context;
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Every ledger store call must fail in bounded time.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SQLxRepo {
    pool: PgPool,
}

impl SQLxRepo {
    pub fn new(pool: PgPool) -> SQLxRepo {
        SQLxRepo { pool }
    }
}

pub async fn create_repos(
    database_url: String,
    max_pool_size: u32,
) -> Result<
    (
        Arc<dyn AccountRepo>,
        Arc<dyn TransactionRepo>,
        Arc<dyn TagRepo>,
        Arc<dyn HealthCheck>,
    ),
    anyhow::Error,
> {
    let pool = PgPoolOptions::new()
        .max_connections(max_pool_size)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(&database_url)
        .await
        .context("Unable to connect to database")?;
    MIGRATOR
        .run(&pool)
        .await
        .context("Unable to run migrations")?;

    let repo = Arc::new(SQLxRepo::new(pool));
    Ok((repo.clone(), repo.clone(), repo.clone(), repo))
}

/// Sorts a driver error into the store's taxonomy: pool exhaustion and I/O
/// problems are retryable `Unavailable`, serialization failures are
/// `Conflict` (the enclosing SQL transaction has already rolled back), the
/// rest is `Other`.
pub(crate) fn store_error(context: String, e: sqlx::Error) -> LedgerRepoError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            LedgerRepoError::Unavailable(anyhow::Error::new(e).context(context))
        }
        sqlx::Error::Database(db) if db.code().as_deref() == Some("40001") => {
            LedgerRepoError::Conflict(db.message().to_owned())
        }
        e => LedgerRepoError::Other(anyhow::Error::new(e).context(context)),
    }
}

#[async_trait]
impl HealthCheck for SQLxRepo {
    async fn check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

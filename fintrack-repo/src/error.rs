use thiserror::Error;

/// Failures surfaced by the ledger store. Ownership misses are reported as
/// the same NotFound variants as genuine absence, so callers cannot probe
/// for other users' entities.
#[derive(Error, Debug)]
pub enum LedgerRepoError {
    #[error("Account with id {0} not found")]
    AccountNotFound(i32),
    #[error("Transaction with id {0} not found")]
    TransactionNotFound(i32),
    #[error("Tag with id {0} not found")]
    TagNotFound(i32),
    /// A concurrent mutation touched the same rows; the whole logical
    /// mutation was rolled back and nothing was applied.
    #[error("Conflicting concurrent update: {0}")]
    Conflict(String),
    /// The store is unreachable or timed out. Retryable by the caller.
    #[error("Ledger store unavailable")]
    Unavailable(#[source] anyhow::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

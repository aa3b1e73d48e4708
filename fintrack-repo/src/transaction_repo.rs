use crate::error::LedgerRepoError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Transactions are the only writes with cross-entity side effects: every
/// mutation here also moves its account's stored balance, and the tag-set
/// edits ride in the same logical unit. Implementations must apply the
/// whole mutation atomically; a partially applied write is a consistency
/// violation.
#[async_trait]
pub trait TransactionRepo: Sync + Send {
    async fn get_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, LedgerRepoError>;

    /// All transactions of the user, transaction_date descending, each fanned
    /// out to its tags. Filtering by an account the user does not own fails
    /// with `AccountNotFound`.
    async fn get_all_transactions(
        &self,
        user: &str,
        account_id: Option<i32>,
    ) -> Result<Vec<Transaction>, LedgerRepoError>;

    /// Inserts the transaction, applies `balance += amount` to its account
    /// and links the given tags, all as one unit.
    async fn create_transaction(
        &self,
        user: &str,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, LedgerRepoError>;

    /// Rewrites the transaction and re-derives balances: the old amount is
    /// backed out of the old account and the new amount applied to the new
    /// one (which may be the same account). The tag set is replaced with
    /// `tag_ids`.
    async fn update_transaction(
        &self,
        user: &str,
        transaction_id: i32,
        updated_transaction: NewTransaction,
    ) -> Result<Transaction, LedgerRepoError>;

    /// Removes the transaction, applies `balance -= amount` and drops its
    /// tag links.
    async fn delete_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, LedgerRepoError>;

    /// Idempotent: succeeds whether or not the link already exists.
    async fn attach_tag(
        &self,
        user: &str,
        transaction_id: i32,
        tag_id: i32,
    ) -> Result<(), LedgerRepoError>;

    /// Idempotent: a missing link is not an error.
    async fn detach_tag(
        &self,
        user: &str,
        transaction_id: i32,
        tag_id: i32,
    ) -> Result<(), LedgerRepoError>;

    /// Replaces the transaction's tag set with `tag_ids` by symmetric
    /// difference: additions are attached before removals are detached, so a
    /// concurrent reader sees a superset of the final set, never a subset.
    async fn replace_tags(
        &self,
        user: &str,
        transaction_id: i32,
        tag_ids: HashSet<i32>,
    ) -> Result<Transaction, LedgerRepoError>;
}

/// Tag view carried by a projected transaction.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct TagRef {
    pub id: i32,
    pub name: String,
    pub color: String,
}

impl TagRef {
    pub const fn new(id: i32, name: String, color: String) -> TagRef {
        TagRef { id, name, color }
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Transaction {
    pub id: i32,
    pub account_id: i32,
    /// Positive inflow, negative outflow.
    pub amount: Decimal,
    pub description: String,
    #[serde(rename = "transaction_date")]
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    /// Sorted by tag name for stable output.
    pub tags: Vec<TagRef>,
}

impl Transaction {
    pub const fn new(
        id: i32,
        account_id: i32,
        amount: Decimal,
        description: String,
        date: NaiveDate,
        created_at: DateTime<Utc>,
        tags: Vec<TagRef>,
    ) -> Transaction {
        Transaction {
            id,
            account_id,
            amount,
            description,
            date,
            created_at,
            tags,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewTransaction {
    pub account_id: i32,
    pub amount: Decimal,
    pub description: String,
    #[serde(rename = "transaction_date", default = "today")]
    pub date: NaiveDate,
    #[serde(default)]
    pub tag_ids: HashSet<i32>,
}

impl NewTransaction {
    pub const fn new(
        account_id: i32,
        amount: Decimal,
        description: String,
        date: NaiveDate,
        tag_ids: HashSet<i32>,
    ) -> NewTransaction {
        NewTransaction {
            account_id,
            amount,
            description,
            date,
            tag_ids,
        }
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

use crate::account_repo::{AccountRepo, AccountType};
use crate::tag_repo::TagRepo;
use crate::transaction_repo::{TagRef, Transaction, TransactionRepo};
use crate::HealthCheck;
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

mod account_repo;
mod tag_repo;
mod transaction_repo;

pub fn create_repos() -> (
    Arc<dyn AccountRepo>,
    Arc<dyn TransactionRepo>,
    Arc<dyn TagRepo>,
    Arc<dyn HealthCheck>,
) {
    let repo = Arc::new(MemLedgerRepo::new());
    (repo.clone(), repo.clone(), repo.clone(), repo)
}

#[derive(Clone)]
struct AccountRow {
    id: i32,
    user_id: String,
    name: String,
    account_type: AccountType,
    balance: Decimal,
    created_at: DateTime<Utc>,
}

#[derive(Clone)]
struct TransactionRow {
    id: i32,
    user_id: String,
    account_id: i32,
    amount: Decimal,
    description: String,
    date: NaiveDate,
    created_at: DateTime<Utc>,
}

#[derive(Clone)]
struct TagRow {
    id: i32,
    user_id: String,
    name: String,
    color: String,
    created_at: DateTime<Utc>,
}

struct State {
    accounts: HashMap<i32, AccountRow>,
    transactions: HashMap<i32, TransactionRow>,
    tags: HashMap<i32, TagRow>,
    /// (transaction_id, tag_id) pairs; the composite key of the relation.
    links: BTreeSet<(i32, i32)>,
    next_account_id: i32,
    next_transaction_id: i32,
    next_tag_id: i32,
}

impl State {
    /// Fans a transaction row out to its tag views, name ascending.
    fn project(&self, row: &TransactionRow) -> Transaction {
        let mut tags: Vec<TagRef> = self
            .links
            .range((row.id, i32::MIN)..=(row.id, i32::MAX))
            .map(|(_, tag_id)| {
                let tag = self
                    .tags
                    .get(tag_id)
                    .expect("links should only reference existing tags");
                TagRef::new(tag.id, tag.name.clone(), tag.color.clone())
            })
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Transaction::new(
            row.id,
            row.account_id,
            row.amount,
            row.description.clone(),
            row.date,
            row.created_at,
            tags,
        )
    }

    fn drop_links_of_transaction(&mut self, transaction_id: i32) {
        let linked: Vec<(i32, i32)> = self
            .links
            .range((transaction_id, i32::MIN)..=(transaction_id, i32::MAX))
            .cloned()
            .collect();
        for link in linked {
            self.links.remove(&link);
        }
    }
}

/// All four tables behind one lock; a write guard spanning a whole mutation
/// is what makes balance updates and cascades atomic here.
pub struct MemLedgerRepo {
    state: RwLock<State>,
}

impl MemLedgerRepo {
    pub fn new() -> MemLedgerRepo {
        let state = State {
            accounts: HashMap::new(),
            transactions: HashMap::new(),
            tags: HashMap::new(),
            links: BTreeSet::new(),
            next_account_id: 1,
            next_transaction_id: 1,
            next_tag_id: 1,
        };
        MemLedgerRepo {
            state: RwLock::new(state),
        }
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<State>, anyhow::Error> {
        self.state
            .read()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<State>, anyhow::Error> {
        self.state
            .write()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }
}

impl Default for MemLedgerRepo {
    fn default() -> Self {
        MemLedgerRepo::new()
    }
}

#[async_trait]
impl HealthCheck for MemLedgerRepo {
    async fn check(&self) -> bool {
        self.read_lock().is_ok()
    }
}

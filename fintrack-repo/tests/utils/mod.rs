pub mod generator;

use fintrack_repo::account_repo::AccountRepo;
use fintrack_repo::tag_repo::TagRepo;
use fintrack_repo::transaction_repo::TransactionRepo;
use std::sync::Arc;
use uuid::Uuid;

pub type Repos = (
    Arc<dyn AccountRepo>,
    Arc<dyn TransactionRepo>,
    Arc<dyn TagRepo>,
);

pub fn build_repos() -> Repos {
    let (account_repo, transaction_repo, tag_repo, _health) =
        fintrack_repo::mem_repo::create_repos();
    (account_repo, transaction_repo, tag_repo)
}

pub fn test_user() -> String {
    "test-user-".to_owned() + &Uuid::new_v4().to_string()
}

use crate::error::LedgerRepoError;
use crate::error::LedgerRepoError::{AccountNotFound, TagNotFound, TransactionNotFound};
use crate::mem_repo::{MemLedgerRepo, State, TransactionRow};
use crate::transaction_repo::{NewTransaction, Transaction, TransactionRepo};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;

impl State {
    fn owned_transaction(&self, user: &str, transaction_id: i32) -> Option<&TransactionRow> {
        self.transactions
            .get(&transaction_id)
            .filter(|t| t.user_id == user)
    }

    fn account_owned(&self, user: &str, account_id: i32) -> bool {
        self.accounts
            .get(&account_id)
            .map(|a| a.user_id == user)
            .unwrap_or(false)
    }

    /// First referenced tag that does not exist for this user, smallest id
    /// first so the error is deterministic.
    fn missing_tag(&self, user: &str, tag_ids: &HashSet<i32>) -> Option<i32> {
        let mut ids: Vec<i32> = tag_ids.iter().cloned().collect();
        ids.sort_unstable();
        ids.into_iter().find(|id| {
            self.tags
                .get(id)
                .map(|t| t.user_id != user)
                .unwrap_or(true)
        })
    }

    /// Symmetric-difference tag replacement. Additions go in before removals
    /// come out so no reader of this state ever sees a subset of the target.
    fn replace_links(&mut self, transaction_id: i32, tag_ids: &HashSet<i32>) {
        let current: HashSet<i32> = self
            .links
            .range((transaction_id, i32::MIN)..=(transaction_id, i32::MAX))
            .map(|(_, tag_id)| *tag_id)
            .collect();

        for added in tag_ids.difference(&current) {
            self.links.insert((transaction_id, *added));
        }
        for removed in current.difference(tag_ids) {
            self.links.remove(&(transaction_id, *removed));
        }
    }
}

#[async_trait]
impl TransactionRepo for MemLedgerRepo {
    async fn get_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, LedgerRepoError> {
        let read_guard = self.read_lock()?;

        let row = read_guard
            .owned_transaction(user, transaction_id)
            .ok_or(TransactionNotFound(transaction_id))?;
        Ok(read_guard.project(row))
    }

    async fn get_all_transactions(
        &self,
        user: &str,
        account_id: Option<i32>,
    ) -> Result<Vec<Transaction>, LedgerRepoError> {
        let read_guard = self.read_lock()?;

        if let Some(account_id) = account_id {
            if !read_guard.account_owned(user, account_id) {
                return Err(AccountNotFound(account_id));
            }
        }

        let mut rows: Vec<&TransactionRow> = read_guard
            .transactions
            .values()
            .filter(|t| t.user_id == user)
            .filter(|t| account_id.map(|id| t.account_id == id).unwrap_or(true))
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

        Ok(rows.into_iter().map(|row| read_guard.project(row)).collect())
    }

    async fn create_transaction(
        &self,
        user: &str,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, LedgerRepoError> {
        let mut write_guard = self.write_lock()?;
        let state = &mut *write_guard;

        if !state.account_owned(user, new_transaction.account_id) {
            return Err(AccountNotFound(new_transaction.account_id));
        }
        if let Some(missing) = state.missing_tag(user, &new_transaction.tag_ids) {
            return Err(TagNotFound(missing));
        }

        let id = state.next_transaction_id;
        state.next_transaction_id += 1;

        let row = TransactionRow {
            id,
            user_id: user.to_owned(),
            account_id: new_transaction.account_id,
            amount: new_transaction.amount,
            description: new_transaction.description,
            date: new_transaction.date,
            created_at: Utc::now(),
        };
        state.transactions.insert(id, row);

        let account = state
            .accounts
            .get_mut(&new_transaction.account_id)
            .expect("account was present under this lock");
        account.balance += new_transaction.amount;

        state.replace_links(id, &new_transaction.tag_ids);

        let row = &state.transactions[&id];
        Ok(state.project(row))
    }

    async fn update_transaction(
        &self,
        user: &str,
        transaction_id: i32,
        updated_transaction: NewTransaction,
    ) -> Result<Transaction, LedgerRepoError> {
        let mut write_guard = self.write_lock()?;
        let state = &mut *write_guard;

        let (old_account_id, old_amount) = state
            .owned_transaction(user, transaction_id)
            .map(|t| (t.account_id, t.amount))
            .ok_or(TransactionNotFound(transaction_id))?;

        if !state.account_owned(user, updated_transaction.account_id) {
            return Err(AccountNotFound(updated_transaction.account_id));
        }
        if let Some(missing) = state.missing_tag(user, &updated_transaction.tag_ids) {
            return Err(TagNotFound(missing));
        }

        if old_account_id == updated_transaction.account_id {
            let account = state
                .accounts
                .get_mut(&old_account_id)
                .expect("account was present under this lock");
            account.balance += updated_transaction.amount - old_amount;
        } else {
            let old_account = state
                .accounts
                .get_mut(&old_account_id)
                .expect("transactions should only reference existing accounts");
            old_account.balance -= old_amount;
            let new_account = state
                .accounts
                .get_mut(&updated_transaction.account_id)
                .expect("account was present under this lock");
            new_account.balance += updated_transaction.amount;
        }

        let row = state
            .transactions
            .get_mut(&transaction_id)
            .expect("transaction was present under this lock");
        row.account_id = updated_transaction.account_id;
        row.amount = updated_transaction.amount;
        row.description = updated_transaction.description;
        row.date = updated_transaction.date;

        state.replace_links(transaction_id, &updated_transaction.tag_ids);

        let row = &state.transactions[&transaction_id];
        Ok(state.project(row))
    }

    async fn delete_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, LedgerRepoError> {
        let mut write_guard = self.write_lock()?;
        let state = &mut *write_guard;

        let row = state
            .owned_transaction(user, transaction_id)
            .ok_or(TransactionNotFound(transaction_id))?;
        let deleted = state.project(row);

        state.transactions.remove(&transaction_id);
        state.drop_links_of_transaction(transaction_id);

        let account = state
            .accounts
            .get_mut(&deleted.account_id)
            .expect("transactions should only reference existing accounts");
        account.balance -= deleted.amount;

        Ok(deleted)
    }

    async fn attach_tag(
        &self,
        user: &str,
        transaction_id: i32,
        tag_id: i32,
    ) -> Result<(), LedgerRepoError> {
        let mut write_guard = self.write_lock()?;

        if write_guard.owned_transaction(user, transaction_id).is_none() {
            return Err(TransactionNotFound(transaction_id));
        }
        if write_guard
            .tags
            .get(&tag_id)
            .filter(|t| t.user_id == user)
            .is_none()
        {
            return Err(TagNotFound(tag_id));
        }

        write_guard.links.insert((transaction_id, tag_id));
        Ok(())
    }

    async fn detach_tag(
        &self,
        user: &str,
        transaction_id: i32,
        tag_id: i32,
    ) -> Result<(), LedgerRepoError> {
        let mut write_guard = self.write_lock()?;

        if write_guard.owned_transaction(user, transaction_id).is_none() {
            return Err(TransactionNotFound(transaction_id));
        }
        if write_guard
            .tags
            .get(&tag_id)
            .filter(|t| t.user_id == user)
            .is_none()
        {
            return Err(TagNotFound(tag_id));
        }

        write_guard.links.remove(&(transaction_id, tag_id));
        Ok(())
    }

    async fn replace_tags(
        &self,
        user: &str,
        transaction_id: i32,
        tag_ids: HashSet<i32>,
    ) -> Result<Transaction, LedgerRepoError> {
        let mut write_guard = self.write_lock()?;
        let state = &mut *write_guard;

        if state.owned_transaction(user, transaction_id).is_none() {
            return Err(TransactionNotFound(transaction_id));
        }
        if let Some(missing) = state.missing_tag(user, &tag_ids) {
            return Err(TagNotFound(missing));
        }

        state.replace_links(transaction_id, &tag_ids);

        let row = &state.transactions[&transaction_id];
        Ok(state.project(row))
    }
}

use crate::account_repo::{Account, AccountRepo, AccountUpdate, NewAccount};
use crate::error::LedgerRepoError;
use crate::error::LedgerRepoError::AccountNotFound;
use crate::mem_repo::{AccountRow, MemLedgerRepo};
use async_trait::async_trait;
use chrono::Utc;

impl From<&AccountRow> for Account {
    fn from(row: &AccountRow) -> Self {
        Account::new(
            row.id,
            row.name.clone(),
            row.account_type,
            row.balance,
            row.created_at,
        )
    }
}

#[async_trait]
impl AccountRepo for MemLedgerRepo {
    async fn get_account(
        &self,
        user: &str,
        account_id: i32,
    ) -> Result<Account, LedgerRepoError> {
        let read_guard = self.read_lock()?;

        read_guard
            .accounts
            .get(&account_id)
            .filter(|a| a.user_id == user)
            .map(Account::from)
            .ok_or(AccountNotFound(account_id))
    }

    async fn get_all_accounts(&self, user: &str) -> Result<Vec<Account>, LedgerRepoError> {
        let read_guard = self.read_lock()?;

        let mut rows: Vec<&AccountRow> = read_guard
            .accounts
            .values()
            .filter(|a| a.user_id == user)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(rows.into_iter().map(Account::from).collect())
    }

    async fn create_account(
        &self,
        user: &str,
        new_account: NewAccount,
    ) -> Result<Account, LedgerRepoError> {
        let mut write_guard = self.write_lock()?;

        let id = write_guard.next_account_id;
        write_guard.next_account_id += 1;

        let row = AccountRow {
            id,
            user_id: user.to_owned(),
            name: new_account.name,
            account_type: new_account.account_type,
            balance: new_account.balance,
            created_at: Utc::now(),
        };
        let account = Account::from(&row);
        write_guard.accounts.insert(id, row);

        Ok(account)
    }

    async fn update_account(
        &self,
        user: &str,
        account_id: i32,
        update: AccountUpdate,
    ) -> Result<Account, LedgerRepoError> {
        let mut write_guard = self.write_lock()?;

        let row = write_guard
            .accounts
            .get_mut(&account_id)
            .filter(|a| a.user_id == user)
            .ok_or(AccountNotFound(account_id))?;

        row.name = update.name;
        row.account_type = update.account_type;

        Ok(Account::from(&*row))
    }

    async fn delete_account(
        &self,
        user: &str,
        account_id: i32,
    ) -> Result<Account, LedgerRepoError> {
        let mut write_guard = self.write_lock()?;

        if write_guard
            .accounts
            .get(&account_id)
            .filter(|a| a.user_id == user)
            .is_none()
        {
            return Err(AccountNotFound(account_id));
        }

        // Cascade: the account's transactions go, and their tag links with
        // them.
        let transaction_ids: Vec<i32> = write_guard
            .transactions
            .values()
            .filter(|t| t.account_id == account_id)
            .map(|t| t.id)
            .collect();
        for transaction_id in transaction_ids {
            write_guard.transactions.remove(&transaction_id);
            write_guard.drop_links_of_transaction(transaction_id);
        }

        let row = write_guard
            .accounts
            .remove(&account_id)
            .expect("account was present under this lock");
        Ok(Account::from(&row))
    }
}

use crate::account_repo::{Account, AccountRepo, AccountType, AccountUpdate, NewAccount};
use crate::error::LedgerRepoError;
use crate::error::LedgerRepoError::AccountNotFound;
use crate::sqlx_repo::{store_error, SQLxRepo};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::query_as;
use std::str::FromStr;
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct AccountEntry {
    id: i32,
    name: String,
    account_type: String,
    balance: Decimal,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountEntry> for Account {
    type Error = LedgerRepoError;

    fn try_from(entry: AccountEntry) -> Result<Self, Self::Error> {
        let account_type = AccountType::from_str(&entry.account_type)?;
        Ok(Account::new(
            entry.id,
            entry.name,
            account_type,
            entry.balance,
            entry.created_at,
        ))
    }
}

#[async_trait]
impl AccountRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_account(
        &self,
        user: &str,
        account_id: i32,
    ) -> Result<Account, LedgerRepoError> {
        let entry: Option<AccountEntry> = query_as(
            "SELECT id, name, account_type, balance, created_at FROM accounts WHERE id = $1 AND user_id = $2",
        )
        .bind(account_id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error(format!("Unable to get account {}", account_id), e))?;
        entry.ok_or(AccountNotFound(account_id))?.try_into()
    }

    #[instrument(skip(self))]
    async fn get_all_accounts(&self, user: &str) -> Result<Vec<Account>, LedgerRepoError> {
        let entries: Vec<AccountEntry> = query_as(
            "SELECT id, name, account_type, balance, created_at FROM accounts WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error(format!("Unable to get accounts for user {}", user), e))?;
        entries.into_iter().map(Account::try_from).collect()
    }

    #[instrument(skip(self, new_account))]
    async fn create_account(
        &self,
        user: &str,
        new_account: NewAccount,
    ) -> Result<Account, LedgerRepoError> {
        let entry: AccountEntry = query_as(
            "INSERT INTO accounts(user_id, name, account_type, balance) VALUES ($1, $2, $3, $4) RETURNING id, name, account_type, balance, created_at",
        )
        .bind(user)
        .bind(&new_account.name)
        .bind(new_account.account_type.as_str())
        .bind(new_account.balance)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error(format!("Unable to create account for user {}", user), e))?;
        entry.try_into()
    }

    #[instrument(skip(self, update))]
    async fn update_account(
        &self,
        user: &str,
        account_id: i32,
        update: AccountUpdate,
    ) -> Result<Account, LedgerRepoError> {
        let entry: Option<AccountEntry> = query_as(
            "UPDATE accounts SET name = $1, account_type = $2 WHERE id = $3 AND user_id = $4 RETURNING id, name, account_type, balance, created_at",
        )
        .bind(&update.name)
        .bind(update.account_type.as_str())
        .bind(account_id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error(format!("Unable to update account {}", account_id), e))?;
        entry.ok_or(AccountNotFound(account_id))?.try_into()
    }

    #[instrument(skip(self))]
    async fn delete_account(
        &self,
        user: &str,
        account_id: i32,
    ) -> Result<Account, LedgerRepoError> {
        // Foreign keys cascade the account's transactions and their links.
        let entry: Option<AccountEntry> = query_as(
            "DELETE FROM accounts WHERE id = $1 AND user_id = $2 RETURNING id, name, account_type, balance, created_at",
        )
        .bind(account_id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error(format!("Unable to delete account {}", account_id), e))?;
        entry.ok_or(AccountNotFound(account_id))?.try_into()
    }
}

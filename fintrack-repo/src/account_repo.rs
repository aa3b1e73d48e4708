use crate::error::LedgerRepoError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[async_trait]
pub trait AccountRepo: Sync + Send {
    async fn get_account(&self, user: &str, account_id: i32)
        -> Result<Account, LedgerRepoError>;

    /// All accounts of the user, newest first.
    async fn get_all_accounts(&self, user: &str) -> Result<Vec<Account>, LedgerRepoError>;

    async fn create_account(
        &self,
        user: &str,
        new_account: NewAccount,
    ) -> Result<Account, LedgerRepoError>;

    /// Renames/retypes an account. The stored balance is not editable here:
    /// it only moves through transaction writes.
    async fn update_account(
        &self,
        user: &str,
        account_id: i32,
        update: AccountUpdate,
    ) -> Result<Account, LedgerRepoError>;

    /// Deletes the account along with its transactions and their tag links.
    async fn delete_account(&self, user: &str, account_id: i32)
        -> Result<Account, LedgerRepoError>;
}

/// Display grouping only; no behavioral differences between the variants.
#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Checking,
    Savings,
    CreditCard,
    Cash,
}

impl AccountType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "checking",
            AccountType::Savings => "savings",
            AccountType::CreditCard => "credit_card",
            AccountType::Cash => "cash",
        }
    }
}

impl FromStr for AccountType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checking" => Ok(AccountType::Checking),
            "savings" => Ok(AccountType::Savings),
            "credit_card" => Ok(AccountType::CreditCard),
            "cash" => Ok(AccountType::Cash),
            _ => Err(anyhow::anyhow!("Unknown account type: {}", s)),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Account {
    pub id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Materialized aggregate: always the opening balance plus the net
    /// amount of the account's transactions.
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub const fn new(
        id: i32,
        name: String,
        account_type: AccountType,
        balance: Decimal,
        created_at: DateTime<Utc>,
    ) -> Account {
        Account {
            id,
            name,
            account_type,
            balance,
            created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewAccount {
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Opening balance. Not a transaction; it is the baseline the balance
    /// invariant is measured against.
    #[serde(default)]
    pub balance: Decimal,
}

impl NewAccount {
    pub const fn new(name: String, account_type: AccountType, balance: Decimal) -> NewAccount {
        NewAccount {
            name,
            account_type,
            balance,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AccountUpdate {
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
}

use crate::error::LedgerRepoError;
use crate::error::LedgerRepoError::{AccountNotFound, TagNotFound, TransactionNotFound};
use crate::sqlx_repo::{store_error, SQLxRepo};
use crate::transaction_repo::{NewTransaction, TagRef, Transaction, TransactionRepo};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{query, query_as, query_scalar, Executor, Postgres, QueryBuilder};
use std::collections::{HashMap, HashSet};
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct TransactionEntry {
    id: i32,
    account_id: i32,
    amount: Decimal,
    description: String,
    date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl TransactionEntry {
    fn into_transaction(self, tags: Vec<TagRef>) -> Transaction {
        Transaction::new(
            self.id,
            self.account_id,
            self.amount,
            self.description,
            self.date,
            self.created_at,
            tags,
        )
    }
}

#[derive(sqlx::FromRow)]
struct TagLinkEntry {
    transaction_id: i32,
    id: i32,
    name: String,
    color: String,
}

impl SQLxRepo {
    /// Tag views for a batch of (already ownership-checked) transactions in
    /// one query, grouped by transaction. Avoids per-transaction round trips
    /// on list reads.
    async fn get_tag_links<'e, E>(
        db_executor: E,
        transaction_ids: Vec<i32>,
    ) -> Result<HashMap<i32, Vec<TagRef>>, LedgerRepoError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if transaction_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let links: Vec<TagLinkEntry> = query_as(
            "SELECT tt.transaction_id, t.id, t.name, t.color FROM transaction_tags tt JOIN tags t ON t.id = tt.tag_id WHERE tt.transaction_id = ANY($1) ORDER BY t.name, t.id",
        )
        .bind(transaction_ids)
        .fetch_all(db_executor)
        .await
        .map_err(|e| store_error("Unable to get tag links".to_owned(), e))?;

        let mut grouped: HashMap<i32, Vec<TagRef>> = HashMap::new();
        for link in links {
            grouped
                .entry(link.transaction_id)
                .or_default()
                .push(TagRef::new(link.id, link.name, link.color));
        }
        Ok(grouped)
    }

    /// Rejects tag ids that do not exist for this user, smallest missing id
    /// first.
    async fn check_tags_exist<'e, E>(
        db_executor: E,
        user: &str,
        tag_ids: &HashSet<i32>,
    ) -> Result<(), LedgerRepoError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if tag_ids.is_empty() {
            return Ok(());
        }
        let mut ids: Vec<i32> = tag_ids.iter().cloned().collect();
        ids.sort_unstable();

        let found: Vec<i32> =
            query_scalar("SELECT id FROM tags WHERE user_id = $1 AND id = ANY($2)")
                .bind(user)
                .bind(ids.clone())
                .fetch_all(db_executor)
                .await
                .map_err(|e| store_error(format!("Unable to check tags for user {}", user), e))?;
        let found: HashSet<i32> = found.into_iter().collect();

        match ids.into_iter().find(|id| !found.contains(id)) {
            Some(missing) => Err(TagNotFound(missing)),
            None => Ok(()),
        }
    }

    /// Applies a balance delta server-side, in the caller's SQL transaction.
    /// Never a caller-side read-modify-write, so concurrent mutations of the
    /// same account serialize in the database.
    async fn apply_balance_delta<'e, E>(
        db_executor: E,
        user: &str,
        account_id: i32,
        delta: Decimal,
    ) -> Result<(), LedgerRepoError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = query(
            "UPDATE accounts SET balance = balance + $1 WHERE id = $2 AND user_id = $3",
        )
        .bind(delta)
        .bind(account_id)
        .bind(user)
        .execute(db_executor)
        .await
        .map_err(|e| store_error(format!("Unable to update balance of account {}", account_id), e))?;
        if result.rows_affected() == 0 {
            Err(AccountNotFound(account_id))
        } else {
            Ok(())
        }
    }

    /// Symmetric-difference replacement of a transaction's tag set. The
    /// insert runs before the delete, so a reader outside the enclosing SQL
    /// transaction can only ever observe a superset of the target set.
    async fn replace_tag_links(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        transaction_id: i32,
        tag_ids: &HashSet<i32>,
    ) -> Result<(), LedgerRepoError> {
        let ids: Vec<i32> = tag_ids.iter().cloned().collect();
        if !ids.is_empty() {
            query(
                "INSERT INTO transaction_tags(transaction_id, tag_id) SELECT $1, UNNEST($2::INT[]) ON CONFLICT DO NOTHING",
            )
            .bind(transaction_id)
            .bind(ids.clone())
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                store_error(format!("Unable to link tags to transaction {}", transaction_id), e)
            })?;
        }
        query("DELETE FROM transaction_tags WHERE transaction_id = $1 AND tag_id <> ALL($2)")
            .bind(transaction_id)
            .bind(ids)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                store_error(
                    format!("Unable to unlink tags from transaction {}", transaction_id),
                    e,
                )
            })?;
        Ok(())
    }

    async fn get_transaction_entry<'e, E>(
        db_executor: E,
        user: &str,
        transaction_id: i32,
    ) -> Result<Option<TransactionEntry>, LedgerRepoError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry: Option<TransactionEntry> = query_as(
            "SELECT id, account_id, amount, description, date, created_at FROM transactions WHERE id = $1 AND user_id = $2",
        )
        .bind(transaction_id)
        .bind(user)
        .fetch_optional(db_executor)
        .await
        .map_err(|e| store_error(format!("Unable to get transaction {}", transaction_id), e))?;
        Ok(entry)
    }
}

#[async_trait]
impl TransactionRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, LedgerRepoError> {
        let entry = Self::get_transaction_entry(&self.pool, user, transaction_id)
            .await?
            .ok_or(TransactionNotFound(transaction_id))?;
        let mut tags = Self::get_tag_links(&self.pool, vec![transaction_id]).await?;
        Ok(entry.into_transaction(tags.remove(&transaction_id).unwrap_or_default()))
    }

    #[instrument(skip(self))]
    async fn get_all_transactions(
        &self,
        user: &str,
        account_id: Option<i32>,
    ) -> Result<Vec<Transaction>, LedgerRepoError> {
        if let Some(account_id) = account_id {
            let owned: Option<i32> =
                query_scalar("SELECT id FROM accounts WHERE id = $1 AND user_id = $2")
                    .bind(account_id)
                    .bind(user)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| {
                        store_error(format!("Unable to check account {}", account_id), e)
                    })?;
            if owned.is_none() {
                return Err(AccountNotFound(account_id));
            }
        }

        let mut query_builder = QueryBuilder::new(
            "SELECT id, account_id, amount, description, date, created_at FROM transactions WHERE user_id = ",
        );
        query_builder.push_bind(user);
        if let Some(account_id) = account_id {
            query_builder
                .push(" AND account_id = ")
                .push_bind(account_id);
        }
        query_builder.push(" ORDER BY date DESC, id DESC");
        let query = query_builder.build_query_as();
        let entries: Vec<TransactionEntry> = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_error(format!("Unable to get transactions for user {}", user), e))?;

        let ids: Vec<i32> = entries.iter().map(|e| e.id).collect();
        let mut tags = Self::get_tag_links(&self.pool, ids).await?;

        Ok(entries
            .into_iter()
            .map(|entry| {
                let entry_tags = tags.remove(&entry.id).unwrap_or_default();
                entry.into_transaction(entry_tags)
            })
            .collect())
    }

    #[instrument(skip(self, new_transaction))]
    async fn create_transaction(
        &self,
        user: &str,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, LedgerRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_error("Unable to begin transaction".to_owned(), e))?;

        // Doubles as the ownership check on the target account.
        Self::apply_balance_delta(
            &mut *tx,
            user,
            new_transaction.account_id,
            new_transaction.amount,
        )
        .await?;
        Self::check_tags_exist(&mut *tx, user, &new_transaction.tag_ids).await?;

        let entry: TransactionEntry = query_as(
            "INSERT INTO transactions(user_id, account_id, amount, description, date) VALUES ($1, $2, $3, $4, $5) RETURNING id, account_id, amount, description, date, created_at",
        )
        .bind(user)
        .bind(new_transaction.account_id)
        .bind(new_transaction.amount)
        .bind(&new_transaction.description)
        .bind(new_transaction.date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| store_error(format!("Unable to insert transaction for user {}", user), e))?;

        Self::replace_tag_links(&mut tx, entry.id, &new_transaction.tag_ids).await?;
        let mut tags = Self::get_tag_links(&mut *tx, vec![entry.id]).await?;

        tx.commit()
            .await
            .map_err(|e| store_error("Unable to commit transaction".to_owned(), e))?;

        let transaction_id = entry.id;
        Ok(entry.into_transaction(tags.remove(&transaction_id).unwrap_or_default()))
    }

    #[instrument(skip(self, updated_transaction))]
    async fn update_transaction(
        &self,
        user: &str,
        transaction_id: i32,
        updated_transaction: NewTransaction,
    ) -> Result<Transaction, LedgerRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_error("Unable to begin transaction".to_owned(), e))?;

        let old: Option<(i32, Decimal)> = query_as(
            "SELECT account_id, amount FROM transactions WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(transaction_id)
        .bind(user)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| store_error(format!("Unable to get transaction {}", transaction_id), e))?;
        let (old_account_id, old_amount) = old.ok_or(TransactionNotFound(transaction_id))?;

        if old_account_id == updated_transaction.account_id {
            Self::apply_balance_delta(
                &mut *tx,
                user,
                old_account_id,
                updated_transaction.amount - old_amount,
            )
            .await?;
        } else {
            Self::apply_balance_delta(&mut *tx, user, old_account_id, -old_amount).await?;
            Self::apply_balance_delta(
                &mut *tx,
                user,
                updated_transaction.account_id,
                updated_transaction.amount,
            )
            .await?;
        }
        Self::check_tags_exist(&mut *tx, user, &updated_transaction.tag_ids).await?;

        let entry: TransactionEntry = query_as(
            "UPDATE transactions SET account_id = $1, amount = $2, description = $3, date = $4 WHERE id = $5 RETURNING id, account_id, amount, description, date, created_at",
        )
        .bind(updated_transaction.account_id)
        .bind(updated_transaction.amount)
        .bind(&updated_transaction.description)
        .bind(updated_transaction.date)
        .bind(transaction_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| store_error(format!("Unable to update transaction {}", transaction_id), e))?;

        Self::replace_tag_links(&mut tx, transaction_id, &updated_transaction.tag_ids).await?;
        let mut tags = Self::get_tag_links(&mut *tx, vec![transaction_id]).await?;

        tx.commit()
            .await
            .map_err(|e| store_error("Unable to commit transaction".to_owned(), e))?;

        Ok(entry.into_transaction(tags.remove(&transaction_id).unwrap_or_default()))
    }

    #[instrument(skip(self))]
    async fn delete_transaction(
        &self,
        user: &str,
        transaction_id: i32,
    ) -> Result<Transaction, LedgerRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_error("Unable to begin transaction".to_owned(), e))?;

        // Project the tags first; the delete cascades them away.
        let mut tags = Self::get_tag_links(&mut *tx, vec![transaction_id]).await?;

        let entry: Option<TransactionEntry> = query_as(
            "DELETE FROM transactions WHERE id = $1 AND user_id = $2 RETURNING id, account_id, amount, description, date, created_at",
        )
        .bind(transaction_id)
        .bind(user)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| store_error(format!("Unable to delete transaction {}", transaction_id), e))?;
        let entry = entry.ok_or(TransactionNotFound(transaction_id))?;

        Self::apply_balance_delta(&mut *tx, user, entry.account_id, -entry.amount).await?;

        tx.commit()
            .await
            .map_err(|e| store_error("Unable to commit transaction".to_owned(), e))?;

        Ok(entry.into_transaction(tags.remove(&transaction_id).unwrap_or_default()))
    }

    #[instrument(skip(self))]
    async fn attach_tag(
        &self,
        user: &str,
        transaction_id: i32,
        tag_id: i32,
    ) -> Result<(), LedgerRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_error("Unable to begin transaction".to_owned(), e))?;

        if Self::get_transaction_entry(&mut *tx, user, transaction_id)
            .await?
            .is_none()
        {
            return Err(TransactionNotFound(transaction_id));
        }
        Self::check_tags_exist(&mut *tx, user, &HashSet::from([tag_id])).await?;

        // ON CONFLICT keeps the attach idempotent.
        query("INSERT INTO transaction_tags(transaction_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(transaction_id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                store_error(format!("Unable to link tag {} to transaction {}", tag_id, transaction_id), e)
            })?;

        tx.commit()
            .await
            .map_err(|e| store_error("Unable to commit transaction".to_owned(), e))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn detach_tag(
        &self,
        user: &str,
        transaction_id: i32,
        tag_id: i32,
    ) -> Result<(), LedgerRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_error("Unable to begin transaction".to_owned(), e))?;

        if Self::get_transaction_entry(&mut *tx, user, transaction_id)
            .await?
            .is_none()
        {
            return Err(TransactionNotFound(transaction_id));
        }
        Self::check_tags_exist(&mut *tx, user, &HashSet::from([tag_id])).await?;

        // Removing a link that is not there is a no-op, not an error.
        query("DELETE FROM transaction_tags WHERE transaction_id = $1 AND tag_id = $2")
            .bind(transaction_id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                store_error(format!("Unable to unlink tag {} from transaction {}", tag_id, transaction_id), e)
            })?;

        tx.commit()
            .await
            .map_err(|e| store_error("Unable to commit transaction".to_owned(), e))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn replace_tags(
        &self,
        user: &str,
        transaction_id: i32,
        tag_ids: HashSet<i32>,
    ) -> Result<Transaction, LedgerRepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_error("Unable to begin transaction".to_owned(), e))?;

        let entry = Self::get_transaction_entry(&mut *tx, user, transaction_id)
            .await?
            .ok_or(TransactionNotFound(transaction_id))?;
        Self::check_tags_exist(&mut *tx, user, &tag_ids).await?;

        Self::replace_tag_links(&mut tx, transaction_id, &tag_ids).await?;
        let mut tags = Self::get_tag_links(&mut *tx, vec![transaction_id]).await?;

        tx.commit()
            .await
            .map_err(|e| store_error("Unable to commit transaction".to_owned(), e))?;

        Ok(entry.into_transaction(tags.remove(&transaction_id).unwrap_or_default()))
    }
}

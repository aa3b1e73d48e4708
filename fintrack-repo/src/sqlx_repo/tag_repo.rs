use crate::error::LedgerRepoError;
use crate::error::LedgerRepoError::TagNotFound;
use crate::sqlx_repo::{store_error, SQLxRepo};
use crate::tag_repo::{NewTag, Tag, TagRepo};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::query_as;
use tracing::instrument;

#[derive(sqlx::FromRow)]
struct TagEntry {
    id: i32,
    name: String,
    color: String,
    created_at: DateTime<Utc>,
}

impl From<TagEntry> for Tag {
    fn from(entry: TagEntry) -> Self {
        Tag::new(entry.id, entry.name, entry.color, entry.created_at)
    }
}

#[async_trait]
impl TagRepo for SQLxRepo {
    #[instrument(skip(self))]
    async fn get_tag(&self, user: &str, tag_id: i32) -> Result<Tag, LedgerRepoError> {
        let entry: Option<TagEntry> = query_as(
            "SELECT id, name, color, created_at FROM tags WHERE id = $1 AND user_id = $2",
        )
        .bind(tag_id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error(format!("Unable to get tag {}", tag_id), e))?;
        Ok(entry.ok_or(TagNotFound(tag_id))?.into())
    }

    #[instrument(skip(self))]
    async fn get_all_tags(&self, user: &str) -> Result<Vec<Tag>, LedgerRepoError> {
        let entries: Vec<TagEntry> = query_as(
            "SELECT id, name, color, created_at FROM tags WHERE user_id = $1 ORDER BY name, id",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error(format!("Unable to get tags for user {}", user), e))?;
        Ok(entries.into_iter().map(Tag::from).collect())
    }

    #[instrument(skip(self, new_tag))]
    async fn create_tag(&self, user: &str, new_tag: NewTag) -> Result<Tag, LedgerRepoError> {
        let entry: TagEntry = query_as(
            "INSERT INTO tags(user_id, name, color) VALUES ($1, $2, $3) RETURNING id, name, color, created_at",
        )
        .bind(user)
        .bind(&new_tag.name)
        .bind(&new_tag.color)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error(format!("Unable to create tag for user {}", user), e))?;
        Ok(entry.into())
    }

    #[instrument(skip(self, updated_tag))]
    async fn update_tag(
        &self,
        user: &str,
        tag_id: i32,
        updated_tag: NewTag,
    ) -> Result<Tag, LedgerRepoError> {
        let entry: Option<TagEntry> = query_as(
            "UPDATE tags SET name = $1, color = $2 WHERE id = $3 AND user_id = $4 RETURNING id, name, color, created_at",
        )
        .bind(&updated_tag.name)
        .bind(&updated_tag.color)
        .bind(tag_id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error(format!("Unable to update tag {}", tag_id), e))?;
        Ok(entry.ok_or(TagNotFound(tag_id))?.into())
    }

    #[instrument(skip(self))]
    async fn delete_tag(&self, user: &str, tag_id: i32) -> Result<Tag, LedgerRepoError> {
        // The transaction_tags foreign key cascades the tag's links.
        let entry: Option<TagEntry> = query_as(
            "DELETE FROM tags WHERE id = $1 AND user_id = $2 RETURNING id, name, color, created_at",
        )
        .bind(tag_id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error(format!("Unable to delete tag {}", tag_id), e))?;
        Ok(entry.ok_or(TagNotFound(tag_id))?.into())
    }
}

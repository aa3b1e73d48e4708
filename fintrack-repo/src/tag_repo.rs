use crate::error::LedgerRepoError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait TagRepo: Sync + Send {
    async fn get_tag(&self, user: &str, tag_id: i32) -> Result<Tag, LedgerRepoError>;

    /// All tags of the user, by name ascending.
    async fn get_all_tags(&self, user: &str) -> Result<Vec<Tag>, LedgerRepoError>;

    async fn create_tag(&self, user: &str, new_tag: NewTag) -> Result<Tag, LedgerRepoError>;

    async fn update_tag(
        &self,
        user: &str,
        tag_id: i32,
        updated_tag: NewTag,
    ) -> Result<Tag, LedgerRepoError>;

    /// Deletes the tag and all of its transaction links in the same step.
    /// The tagged transactions themselves are untouched.
    async fn delete_tag(&self, user: &str, tag_id: i32) -> Result<Tag, LedgerRepoError>;
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    pub const fn new(id: i32, name: String, color: String, created_at: DateTime<Utc>) -> Tag {
        Tag {
            id,
            name,
            color,
            created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NewTag {
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
}

impl NewTag {
    pub const fn new(name: String, color: String) -> NewTag {
        NewTag { name, color }
    }
}

fn default_color() -> String {
    "#3B82F6".to_string()
}

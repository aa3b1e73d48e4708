use crate::error::LedgerRepoError;
use crate::error::LedgerRepoError::TagNotFound;
use crate::mem_repo::{MemLedgerRepo, TagRow};
use crate::tag_repo::{NewTag, Tag, TagRepo};
use async_trait::async_trait;
use chrono::Utc;

impl From<&TagRow> for Tag {
    fn from(row: &TagRow) -> Self {
        Tag::new(row.id, row.name.clone(), row.color.clone(), row.created_at)
    }
}

#[async_trait]
impl TagRepo for MemLedgerRepo {
    async fn get_tag(&self, user: &str, tag_id: i32) -> Result<Tag, LedgerRepoError> {
        let read_guard = self.read_lock()?;

        read_guard
            .tags
            .get(&tag_id)
            .filter(|t| t.user_id == user)
            .map(Tag::from)
            .ok_or(TagNotFound(tag_id))
    }

    async fn get_all_tags(&self, user: &str) -> Result<Vec<Tag>, LedgerRepoError> {
        let read_guard = self.read_lock()?;

        let mut rows: Vec<&TagRow> = read_guard
            .tags
            .values()
            .filter(|t| t.user_id == user)
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn create_tag(&self, user: &str, new_tag: NewTag) -> Result<Tag, LedgerRepoError> {
        let mut write_guard = self.write_lock()?;

        let id = write_guard.next_tag_id;
        write_guard.next_tag_id += 1;

        let row = TagRow {
            id,
            user_id: user.to_owned(),
            name: new_tag.name,
            color: new_tag.color,
            created_at: Utc::now(),
        };
        let tag = Tag::from(&row);
        write_guard.tags.insert(id, row);

        Ok(tag)
    }

    async fn update_tag(
        &self,
        user: &str,
        tag_id: i32,
        updated_tag: NewTag,
    ) -> Result<Tag, LedgerRepoError> {
        let mut write_guard = self.write_lock()?;

        let row = write_guard
            .tags
            .get_mut(&tag_id)
            .filter(|t| t.user_id == user)
            .ok_or(TagNotFound(tag_id))?;

        row.name = updated_tag.name;
        row.color = updated_tag.color;

        Ok(Tag::from(&*row))
    }

    async fn delete_tag(&self, user: &str, tag_id: i32) -> Result<Tag, LedgerRepoError> {
        let mut write_guard = self.write_lock()?;

        if write_guard
            .tags
            .get(&tag_id)
            .filter(|t| t.user_id == user)
            .is_none()
        {
            return Err(TagNotFound(tag_id));
        }

        // Cascade: every link naming this tag goes with it.
        let linked: Vec<(i32, i32)> = write_guard
            .links
            .iter()
            .filter(|(_, t)| *t == tag_id)
            .cloned()
            .collect();
        for link in linked {
            write_guard.links.remove(&link);
        }

        let row = write_guard
            .tags
            .remove(&tag_id)
            .expect("tag was present under this lock");
        Ok(Tag::from(&row))
    }
}

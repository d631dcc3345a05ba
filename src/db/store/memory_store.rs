use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{BacklogStore, NewTsundoku, StoreError, StoreResult};
use crate::db::entities::{tag, tsundoku, tsundoku_tag, user};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, user::Model>,
    tsundokus: BTreeMap<i32, tsundoku::Model>,
    tags: BTreeMap<i32, tag::Model>,
    tsundoku_tags: BTreeMap<i32, tsundoku_tag::Model>,
    last_user_id: i32,
    last_tsundoku_id: i32,
    last_tag_id: i32,
    last_tsundoku_tag_id: i32,
}

fn next_id(last: &mut i32) -> i32 {
    *last += 1;
    *last
}

impl Tables {
    fn tag_named(&self, user_id: i32, name: &str) -> Option<&tag::Model> {
        self.tags
            .values()
            .find(|tag| tag.user_id == user_id && tag.name == name)
    }

    fn push_tag(&mut self, user_id: i32, name: &str) -> tag::Model {
        let now = Utc::now();
        let model = tag::Model {
            id: next_id(&mut self.last_tag_id),
            user_id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.tags.insert(model.id, model.clone());
        model
    }
}

/// Process-local backend used when no database is configured, and by tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BacklogStore for MemoryStore {
    async fn find_or_create_user(&self, line_user_id: &str, name: &str) -> StoreResult<user::Model> {
        // The write lock spans lookup and insert.
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.users.values().find(|u| u.line_user_id == line_user_id) {
            return Ok(existing.clone());
        }

        let now = Utc::now();
        let user = user::Model {
            id: next_id(&mut tables.last_user_id),
            name: name.to_string(),
            line_user_id: line_user_id.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, user_id: i32) -> StoreResult<Option<user::Model>> {
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }

    async fn delete_user(&self, user_id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        tables.tsundoku_tags.retain(|_, link| link.user_id != user_id);
        tables.tsundokus.retain(|_, item| item.user_id != user_id);
        tables.tags.retain(|_, tag| tag.user_id != user_id);
        Ok(tables.users.remove(&user_id).is_some())
    }

    async fn insert_tsundoku(&self, new: NewTsundoku) -> StoreResult<tsundoku::Model> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let model = tsundoku::Model {
            id: next_id(&mut tables.last_tsundoku_id),
            user_id: new.user_id,
            title: new.title,
            category: new.category,
            required_time: new.required_time,
            deadline: new.deadline,
            url: new.url,
            author: new.author,
            created_at: now,
            updated_at: now,
        };
        tables.tsundokus.insert(model.id, model.clone());
        Ok(model)
    }

    async fn find_tsundoku(&self, tsundoku_id: i32) -> StoreResult<Option<tsundoku::Model>> {
        Ok(self.tables.read().await.tsundokus.get(&tsundoku_id).cloned())
    }

    async fn tsundokus_for_user(&self, user_id: i32) -> StoreResult<Vec<tsundoku::Model>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tsundokus
            .values()
            .filter(|item| item.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_tsundoku(&self, tsundoku_id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        tables.tsundoku_tags.retain(|_, link| link.tsundoku_id != tsundoku_id);
        Ok(tables.tsundokus.remove(&tsundoku_id).is_some())
    }

    async fn insert_tag(&self, user_id: i32, name: &str) -> StoreResult<tag::Model> {
        let mut tables = self.tables.write().await;
        if tables.tag_named(user_id, name).is_some() {
            return Err(StoreError::Duplicate("Tag"));
        }
        Ok(tables.push_tag(user_id, name))
    }

    async fn find_or_create_tag(&self, user_id: i32, name: &str) -> StoreResult<tag::Model> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.tag_named(user_id, name) {
            return Ok(existing.clone());
        }
        Ok(tables.push_tag(user_id, name))
    }

    async fn find_tag(&self, tag_id: i32) -> StoreResult<Option<tag::Model>> {
        Ok(self.tables.read().await.tags.get(&tag_id).cloned())
    }

    async fn tags_for_user(&self, user_id: i32) -> StoreResult<Vec<tag::Model>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tags
            .values()
            .filter(|tag| tag.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn tags_by_ids(&self, tag_ids: &[i32]) -> StoreResult<Vec<tag::Model>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tags
            .values()
            .filter(|tag| tag_ids.contains(&tag.id))
            .cloned()
            .collect())
    }

    async fn delete_tag(&self, tag_id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        tables.tsundoku_tags.retain(|_, link| link.tag_id != tag_id);
        Ok(tables.tags.remove(&tag_id).is_some())
    }

    async fn insert_tsundoku_tag(
        &self,
        tsundoku_id: i32,
        tag_id: i32,
        user_id: i32,
    ) -> StoreResult<tsundoku_tag::Model> {
        let mut tables = self.tables.write().await;
        if tables
            .tsundoku_tags
            .values()
            .any(|link| link.tsundoku_id == tsundoku_id && link.tag_id == tag_id)
        {
            return Err(StoreError::Duplicate("Tag link"));
        }

        let now = Utc::now();
        let model = tsundoku_tag::Model {
            id: next_id(&mut tables.last_tsundoku_tag_id),
            tsundoku_id,
            tag_id,
            user_id,
            created_at: now,
            updated_at: now,
        };
        tables.tsundoku_tags.insert(model.id, model.clone());
        Ok(model)
    }

    async fn tsundoku_tags_for(
        &self,
        tsundoku_id: i32,
        user_id: i32,
    ) -> StoreResult<Vec<tsundoku_tag::Model>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tsundoku_tags
            .values()
            .filter(|link| link.tsundoku_id == tsundoku_id && link.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_tsundoku_tag(&self, tsundoku_id: i32, tag_id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.tsundoku_tags.len();
        tables
            .tsundoku_tags
            .retain(|_, link| !(link.tsundoku_id == tsundoku_id && link.tag_id == tag_id));
        Ok(tables.tsundoku_tags.len() < before)
    }
}

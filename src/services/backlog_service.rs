//! Tsundoku and tag operations on behalf of an authenticated user.
//!
//! Every call takes the caller's user id. Reads are scoped to it and every
//! mutation checks ownership first: a missing id is `NotFound`, someone
//! else's id is `Forbidden`.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::entities::{tag, tsundoku};
use crate::db::store::{BacklogStore, NewTsundoku, StoreError};
use crate::services::time_budget::{self, normalize_required_time};
use crate::web::error::AppError;
use crate::web::models::CreateTsundokuRequest;

const DEADLINE_FORMAT: &str = "%Y-%m-%d";

/// A tsundoku together with the tags attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct TsundokuWithTags {
    pub tsundoku: tsundoku::Model,
    pub tags: Vec<tag::Model>,
}

impl AsRef<tsundoku::Model> for TsundokuWithTags {
    fn as_ref(&self) -> &tsundoku::Model {
        &self.tsundoku
    }
}

#[derive(Clone)]
pub struct BacklogService {
    store: Arc<dyn BacklogStore>,
}

impl BacklogService {
    pub fn new(store: Arc<dyn BacklogStore>) -> Self {
        Self { store }
    }

    // --- Tsundokus ---

    pub async fn create_tsundoku(
        &self,
        user_id: i32,
        req: CreateTsundokuRequest,
    ) -> Result<tsundoku::Model, AppError> {
        let title = required_field("title", &req.title)?;
        let category = required_field("category", &req.category)?;
        let required_time = normalize_required_time(&req.required_time)?;
        let deadline = match req.deadline.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_deadline(raw)?),
        };

        let created = self
            .store
            .insert_tsundoku(NewTsundoku {
                user_id,
                title,
                category,
                required_time,
                deadline,
                url: optional_field(req.url),
                author: optional_field(req.author),
            })
            .await?;
        info!(user_id, tsundoku_id = created.id, "Tsundoku created.");
        Ok(created)
    }

    /// All of the caller's tsundokus, oldest first, each with its tags.
    pub async fn list_tsundokus(&self, user_id: i32) -> Result<Vec<TsundokuWithTags>, AppError> {
        let tsundokus = self.store.tsundokus_for_user(user_id).await?;
        let mut result = Vec::with_capacity(tsundokus.len());
        for tsundoku in tsundokus {
            let tags = self.resolve_tags(tsundoku.id, user_id).await?;
            result.push(TsundokuWithTags { tsundoku, tags });
        }
        Ok(result)
    }

    /// Tsundokus readable within `budget_minutes`.
    pub async fn free_tsundokus(
        &self,
        user_id: i32,
        budget_minutes: u32,
    ) -> Result<Vec<TsundokuWithTags>, AppError> {
        let all = self.list_tsundokus(user_id).await?;
        Ok(time_budget::free_items(all, budget_minutes))
    }

    pub async fn delete_tsundoku(&self, user_id: i32, tsundoku_id: i32) -> Result<(), AppError> {
        self.owned_tsundoku(user_id, tsundoku_id).await?;
        if !self.store.delete_tsundoku(tsundoku_id).await? {
            return Err(not_found("Tsundoku", tsundoku_id));
        }
        info!(user_id, tsundoku_id, "Tsundoku deleted.");
        Ok(())
    }

    // --- Tags ---

    pub async fn create_tag(&self, user_id: i32, name: &str) -> Result<tag::Model, AppError> {
        let name = required_field("name", name)?;
        match self.store.insert_tag(user_id, &name).await {
            Ok(tag) => Ok(tag),
            Err(StoreError::Duplicate(_)) => {
                Err(AppError::Conflict(format!("Tag {name:?} already exists")))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_tags(&self, user_id: i32) -> Result<Vec<tag::Model>, AppError> {
        Ok(self.store.tags_for_user(user_id).await?)
    }

    pub async fn delete_tag(&self, user_id: i32, tag_id: i32) -> Result<(), AppError> {
        self.owned_tag(user_id, tag_id).await?;
        if !self.store.delete_tag(tag_id).await? {
            return Err(not_found("Tag", tag_id));
        }
        info!(user_id, tag_id, "Tag deleted.");
        Ok(())
    }

    // --- Tags on a tsundoku ---

    pub async fn tags_for_tsundoku(
        &self,
        user_id: i32,
        tsundoku_id: i32,
    ) -> Result<Vec<tag::Model>, AppError> {
        self.owned_tsundoku(user_id, tsundoku_id).await?;
        self.resolve_tags(tsundoku_id, user_id).await
    }

    pub async fn attach_tag(
        &self,
        user_id: i32,
        tsundoku_id: i32,
        tag_id: i32,
    ) -> Result<tag::Model, AppError> {
        self.owned_tsundoku(user_id, tsundoku_id).await?;
        let tag = self.owned_tag(user_id, tag_id).await?;
        self.link(user_id, tsundoku_id, &tag).await?;
        Ok(tag)
    }

    /// Attaches the caller's tag called `name`, creating it if needed.
    pub async fn create_and_attach_tag(
        &self,
        user_id: i32,
        tsundoku_id: i32,
        name: &str,
    ) -> Result<tag::Model, AppError> {
        let name = required_field("name", name)?;
        self.owned_tsundoku(user_id, tsundoku_id).await?;

        let tag = self.store.find_or_create_tag(user_id, &name).await?;
        self.link(user_id, tsundoku_id, &tag).await?;
        Ok(tag)
    }

    pub async fn detach_tag(
        &self,
        user_id: i32,
        tsundoku_id: i32,
        tag_id: i32,
    ) -> Result<(), AppError> {
        self.owned_tsundoku(user_id, tsundoku_id).await?;
        if !self.store.delete_tsundoku_tag(tsundoku_id, tag_id).await? {
            return Err(AppError::NotFound(format!(
                "Tag {tag_id} is not attached to tsundoku {tsundoku_id}"
            )));
        }
        Ok(())
    }

    // --- helpers ---

    async fn link(&self, user_id: i32, tsundoku_id: i32, tag: &tag::Model) -> Result<(), AppError> {
        match self.store.insert_tsundoku_tag(tsundoku_id, tag.id, user_id).await {
            Ok(_) => Ok(()),
            Err(StoreError::Duplicate(_)) => Err(AppError::Conflict(format!(
                "Tag {} is already attached to tsundoku {tsundoku_id}",
                tag.id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn resolve_tags(&self, tsundoku_id: i32, user_id: i32) -> Result<Vec<tag::Model>, AppError> {
        let links = self.store.tsundoku_tags_for(tsundoku_id, user_id).await?;
        let tag_ids: Vec<i32> = links.iter().map(|link| link.tag_id).collect();
        Ok(self.store.tags_by_ids(&tag_ids).await?)
    }

    async fn owned_tsundoku(&self, user_id: i32, tsundoku_id: i32) -> Result<tsundoku::Model, AppError> {
        let tsundoku = self
            .store
            .find_tsundoku(tsundoku_id)
            .await?
            .ok_or_else(|| not_found("Tsundoku", tsundoku_id))?;
        if tsundoku.user_id != user_id {
            warn!(user_id, tsundoku_id, owner_id = tsundoku.user_id, "Access to another user's tsundoku denied.");
            return Err(AppError::Forbidden(format!("Tsundoku {tsundoku_id} belongs to another user")));
        }
        Ok(tsundoku)
    }

    async fn owned_tag(&self, user_id: i32, tag_id: i32) -> Result<tag::Model, AppError> {
        let tag = self
            .store
            .find_tag(tag_id)
            .await?
            .ok_or_else(|| not_found("Tag", tag_id))?;
        if tag.user_id != user_id {
            warn!(user_id, tag_id, owner_id = tag.user_id, "Access to another user's tag denied.");
            return Err(AppError::Forbidden(format!("Tag {tag_id} belongs to another user")));
        }
        Ok(tag)
    }
}

fn not_found(what: &str, id: i32) -> AppError {
    AppError::NotFound(format!("{what} {id} not found"))
}

fn required_field(field: &str, value: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

fn optional_field(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Strict `YYYY-MM-DD`.
pub fn parse_deadline(raw: &str) -> Result<NaiveDate, AppError> {
    let invalid = || AppError::InvalidInput(format!("deadline {raw:?} is not a YYYY-MM-DD date"));
    let shape_ok = raw.len() == 10
        && raw.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(raw, DEADLINE_FORMAT).map_err(|_| invalid())
}

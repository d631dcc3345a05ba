//! The storage capability set the backlog logic is written against.
//!
//! Every backend offers the same small surface: create, find-for-user,
//! find-by-id-set, find-by-two-ids, delete-by-id and find-or-create for
//! users. Ownership and validation live above this layer, in
//! `services::backlog_service`.

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::db::entities::{tag, tsundoku, tsundoku_tag, user};

pub mod memory_store;
pub mod sea_orm_store;

pub use memory_store::MemoryStore;
pub use sea_orm_store::SeaOrmStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} already exists")]
    Duplicate(&'static str),
    #[error("Database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::Duplicate("Record"),
            _ => StoreError::Database(err),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A tsundoku that has already passed validation.
#[derive(Debug, Clone)]
pub struct NewTsundoku {
    pub user_id: i32,
    pub title: String,
    pub category: String,
    pub required_time: String,
    pub deadline: Option<NaiveDate>,
    pub url: Option<String>,
    pub author: Option<String>,
}

#[async_trait]
pub trait BacklogStore: Send + Sync {
    // --- users ---

    /// Returns the user linked to `line_user_id`, creating it with `name`
    /// on first sight. At most one row exists per LINE account.
    async fn find_or_create_user(&self, line_user_id: &str, name: &str) -> StoreResult<user::Model>;
    async fn find_user(&self, user_id: i32) -> StoreResult<Option<user::Model>>;
    /// Removes the user together with all their tsundokus, tags and links.
    async fn delete_user(&self, user_id: i32) -> StoreResult<bool>;

    // --- tsundokus ---

    async fn insert_tsundoku(&self, new: NewTsundoku) -> StoreResult<tsundoku::Model>;
    async fn find_tsundoku(&self, tsundoku_id: i32) -> StoreResult<Option<tsundoku::Model>>;
    /// Ordered by id.
    async fn tsundokus_for_user(&self, user_id: i32) -> StoreResult<Vec<tsundoku::Model>>;
    /// Removes the tsundoku and its tag links.
    async fn delete_tsundoku(&self, tsundoku_id: i32) -> StoreResult<bool>;

    // --- tags ---

    /// Fails with `StoreError::Duplicate` when the user already has a tag
    /// with this name.
    async fn insert_tag(&self, user_id: i32, name: &str) -> StoreResult<tag::Model>;
    /// The user's tag called `name`, created if missing. Concurrent callers
    /// with the same name get the same row.
    async fn find_or_create_tag(&self, user_id: i32, name: &str) -> StoreResult<tag::Model>;
    async fn find_tag(&self, tag_id: i32) -> StoreResult<Option<tag::Model>>;
    /// Ordered by id.
    async fn tags_for_user(&self, user_id: i32) -> StoreResult<Vec<tag::Model>>;
    /// Ordered by id. Unknown ids are skipped.
    async fn tags_by_ids(&self, tag_ids: &[i32]) -> StoreResult<Vec<tag::Model>>;
    /// Removes the tag and its tsundoku links.
    async fn delete_tag(&self, tag_id: i32) -> StoreResult<bool>;

    // --- tsundoku <-> tag links ---

    /// Fails with `StoreError::Duplicate` when the pair is already linked.
    async fn insert_tsundoku_tag(
        &self,
        tsundoku_id: i32,
        tag_id: i32,
        user_id: i32,
    ) -> StoreResult<tsundoku_tag::Model>;
    async fn tsundoku_tags_for(
        &self,
        tsundoku_id: i32,
        user_id: i32,
    ) -> StoreResult<Vec<tsundoku_tag::Model>>;
    async fn delete_tsundoku_tag(&self, tsundoku_id: i32, tag_id: i32) -> StoreResult<bool>;
}

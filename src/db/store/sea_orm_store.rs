use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::debug;

use super::{BacklogStore, NewTsundoku, StoreResult};
use crate::db::entities::{tag, tsundoku, tsundoku_tag, user};

/// Relational backend. Postgres in production, SQLite for local runs and tests.
#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BacklogStore for SeaOrmStore {
    async fn find_or_create_user(&self, line_user_id: &str, name: &str) -> StoreResult<user::Model> {
        let now = Utc::now();
        let candidate = user::ActiveModel {
            name: Set(name.to_string()),
            line_user_id: Set(line_user_id.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        // Concurrent first logins race on the unique index; the loser inserts nothing.
        let inserted = user::Entity::insert(candidate)
            .on_conflict(
                OnConflict::column(user::Column::LineUserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        if inserted > 0 {
            debug!(line_user_id, "Created user on first login.");
        }

        let user = user::Entity::find()
            .filter(user::Column::LineUserId.eq(line_user_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| sea_orm::DbErr::RecordNotFound(format!("user {line_user_id}")))?;
        Ok(user)
    }

    async fn find_user(&self, user_id: i32) -> StoreResult<Option<user::Model>> {
        Ok(user::Entity::find_by_id(user_id).one(&self.db).await?)
    }

    async fn delete_user(&self, user_id: i32) -> StoreResult<bool> {
        let txn = self.db.begin().await?;

        tsundoku_tag::Entity::delete_many()
            .filter(tsundoku_tag::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        tsundoku::Entity::delete_many()
            .filter(tsundoku::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        tag::Entity::delete_many()
            .filter(tag::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        let result = user::Entity::delete_by_id(user_id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    async fn insert_tsundoku(&self, new: NewTsundoku) -> StoreResult<tsundoku::Model> {
        let now = Utc::now();
        let model = tsundoku::ActiveModel {
            user_id: Set(new.user_id),
            title: Set(new.title),
            category: Set(new.category),
            required_time: Set(new.required_time),
            deadline: Set(new.deadline),
            url: Set(new.url),
            author: Set(new.author),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        Ok(model.insert(&self.db).await?)
    }

    async fn find_tsundoku(&self, tsundoku_id: i32) -> StoreResult<Option<tsundoku::Model>> {
        Ok(tsundoku::Entity::find_by_id(tsundoku_id).one(&self.db).await?)
    }

    async fn tsundokus_for_user(&self, user_id: i32) -> StoreResult<Vec<tsundoku::Model>> {
        Ok(tsundoku::Entity::find()
            .filter(tsundoku::Column::UserId.eq(user_id))
            .order_by_asc(tsundoku::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn delete_tsundoku(&self, tsundoku_id: i32) -> StoreResult<bool> {
        let txn = self.db.begin().await?;
        tsundoku_tag::Entity::delete_many()
            .filter(tsundoku_tag::Column::TsundokuId.eq(tsundoku_id))
            .exec(&txn)
            .await?;
        let result = tsundoku::Entity::delete_by_id(tsundoku_id).exec(&txn).await?;
        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    async fn insert_tag(&self, user_id: i32, name: &str) -> StoreResult<tag::Model> {
        let now = Utc::now();
        let model = tag::ActiveModel {
            user_id: Set(user_id),
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        Ok(model.insert(&self.db).await?)
    }

    async fn find_or_create_tag(&self, user_id: i32, name: &str) -> StoreResult<tag::Model> {
        let now = Utc::now();
        let candidate = tag::ActiveModel {
            user_id: Set(user_id),
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        tag::Entity::insert(candidate)
            .on_conflict(
                OnConflict::columns([tag::Column::UserId, tag::Column::Name])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        let tag = tag::Entity::find()
            .filter(tag::Column::UserId.eq(user_id))
            .filter(tag::Column::Name.eq(name))
            .one(&self.db)
            .await?
            .ok_or_else(|| sea_orm::DbErr::RecordNotFound(format!("tag {name} of user {user_id}")))?;
        Ok(tag)
    }

    async fn find_tag(&self, tag_id: i32) -> StoreResult<Option<tag::Model>> {
        Ok(tag::Entity::find_by_id(tag_id).one(&self.db).await?)
    }

    async fn tags_for_user(&self, user_id: i32) -> StoreResult<Vec<tag::Model>> {
        Ok(tag::Entity::find()
            .filter(tag::Column::UserId.eq(user_id))
            .order_by_asc(tag::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn tags_by_ids(&self, tag_ids: &[i32]) -> StoreResult<Vec<tag::Model>> {
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(tag::Entity::find()
            .filter(tag::Column::Id.is_in(tag_ids.iter().copied()))
            .order_by_asc(tag::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn delete_tag(&self, tag_id: i32) -> StoreResult<bool> {
        let txn = self.db.begin().await?;
        tsundoku_tag::Entity::delete_many()
            .filter(tsundoku_tag::Column::TagId.eq(tag_id))
            .exec(&txn)
            .await?;
        let result = tag::Entity::delete_by_id(tag_id).exec(&txn).await?;
        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    async fn insert_tsundoku_tag(
        &self,
        tsundoku_id: i32,
        tag_id: i32,
        user_id: i32,
    ) -> StoreResult<tsundoku_tag::Model> {
        let now = Utc::now();
        let model = tsundoku_tag::ActiveModel {
            tsundoku_id: Set(tsundoku_id),
            tag_id: Set(tag_id),
            user_id: Set(user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        Ok(model.insert(&self.db).await?)
    }

    async fn tsundoku_tags_for(
        &self,
        tsundoku_id: i32,
        user_id: i32,
    ) -> StoreResult<Vec<tsundoku_tag::Model>> {
        Ok(tsundoku_tag::Entity::find()
            .filter(tsundoku_tag::Column::TsundokuId.eq(tsundoku_id))
            .filter(tsundoku_tag::Column::UserId.eq(user_id))
            .order_by_asc(tsundoku_tag::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn delete_tsundoku_tag(&self, tsundoku_id: i32, tag_id: i32) -> StoreResult<bool> {
        let result = tsundoku_tag::Entity::delete_many()
            .filter(tsundoku_tag::Column::TsundokuId.eq(tsundoku_id))
            .filter(tsundoku_tag::Column::TagId.eq(tag_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

//! Creates the tables from the entity definitions when they are missing.

use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Schema};
use tracing::info;

use crate::db::entities::prelude::*;
use crate::db::entities::{tag, tsundoku_tag};

pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    // Parents before children so foreign keys resolve.
    create_table(db, &schema, User).await?;
    create_table(db, &schema, Tag).await?;
    create_table(db, &schema, Tsundoku).await?;
    create_table(db, &schema, TsundokuTag).await?;

    let pair_index = Index::create()
        .name("idx_tsundoku_tags_tsundoku_id_tag_id")
        .table(TsundokuTag)
        .col(tsundoku_tag::Column::TsundokuId)
        .col(tsundoku_tag::Column::TagId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&pair_index)).await?;

    let tag_name_index = Index::create()
        .name("idx_tags_user_id_name")
        .table(Tag)
        .col(tag::Column::UserId)
        .col(tag::Column::Name)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&tag_name_index)).await?;

    info!(backend = ?backend, "Database schema is ready.");
    Ok(())
}

async fn create_table<E: EntityTrait>(
    db: &DatabaseConnection,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(db.get_database_backend().build(&stmt)).await?;
    Ok(())
}

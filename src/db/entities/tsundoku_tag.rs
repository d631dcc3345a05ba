use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Links a tsundoku to a tag. `user_id` must match the owner of both sides.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tsundoku_tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub tsundoku_id: i32,
    pub tag_id: i32,
    pub user_id: i32,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tsundoku::Entity",
        from = "Column::TsundokuId",
        to = "super::tsundoku::Column::Id",
        on_delete = "Cascade",
        on_update = "Cascade"
    )]
    Tsundoku,
    #[sea_orm(
        belongs_to = "super::tag::Entity",
        from = "Column::TagId",
        to = "super::tag::Column::Id",
        on_delete = "Cascade",
        on_update = "Cascade"
    )]
    Tag,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade",
        on_update = "Cascade"
    )]
    User,
}

impl Related<super::tsundoku::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tsundoku.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

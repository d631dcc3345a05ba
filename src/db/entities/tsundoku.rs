use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An unread backlog item.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tsundokus")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub category: String,
    /// Canonical "<N>min" form, validated on insert.
    pub required_time: String,
    pub deadline: Option<Date>,
    pub url: Option<String>,
    pub author: Option<String>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade",
        on_update = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::tsundoku_tag::Entity")]
    TsundokuTags,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::tsundoku_tag::Relation::Tag.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::tsundoku_tag::Relation::Tsundoku.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl AsRef<Model> for Model {
    fn as_ref(&self) -> &Model {
        self
    }
}

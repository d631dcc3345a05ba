use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::entities::{tag, tsundoku, user};
use crate::services::TsundokuWithTags;

/// Struct to hold authenticated user details, to be passed as a request extension.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub name: String,
}

/// User as shown to clients. The LINE id stays server-side.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<tag::Model> for TagResponse {
    fn from(tag: tag::Model) -> Self {
        Self {
            id: tag.id,
            user_id: tag.user_id,
            name: tag.name,
            created_at: tag.created_at,
            updated_at: tag.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TsundokuResponse {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub category: String,
    pub required_time: String,
    pub deadline: Option<NaiveDate>,
    pub url: Option<String>,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Absent on freshly created items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<TagResponse>>,
}

impl From<tsundoku::Model> for TsundokuResponse {
    fn from(t: tsundoku::Model) -> Self {
        Self {
            id: t.id,
            user_id: t.user_id,
            title: t.title,
            category: t.category,
            required_time: t.required_time,
            deadline: t.deadline,
            url: t.url,
            author: t.author,
            created_at: t.created_at,
            updated_at: t.updated_at,
            tags: None,
        }
    }
}

impl From<TsundokuWithTags> for TsundokuResponse {
    fn from(t: TsundokuWithTags) -> Self {
        let tags = t.tags.into_iter().map(TagResponse::from).collect();
        Self {
            tags: Some(tags),
            ..Self::from(t.tsundoku)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTsundokuRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, alias = "required_time")]
    pub required_time: String,
    /// `YYYY-MM-DD`; empty or absent means no deadline.
    pub deadline: Option<String>,
    pub url: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateTagRequest {
    #[serde(default)]
    pub name: String,
}

/// Body of `POST /api/tsundokus/{id}/tags`: either an existing tag id or a
/// name to create (or reuse) and attach.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachTagRequest {
    #[serde(alias = "tag_id")]
    pub tag_id: Option<i32>,
    pub name: Option<String>,
}

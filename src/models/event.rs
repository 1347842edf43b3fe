use crate::entities::{event_entity, event_image_entity};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::double_option;

#[derive(Debug, Serialize, ToSchema)]
pub struct EventImageResponse {
    pub id: i64,
    pub image_url: String,
    pub caption: Option<String>,
    pub sort_order: i32,
}

impl From<event_image_entity::Model> for EventImageResponse {
    fn from(m: event_image_entity::Model) -> Self {
        Self {
            id: m.id,
            image_url: m.image_url,
            caption: m.caption,
            sort_order: m.sort_order,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EventResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub cover_image_url: Option<String>,
    pub is_published: bool,
    pub images: Vec<EventImageResponse>,
    pub created_at: Option<DateTime<Utc>>,
}

impl EventResponse {
    pub fn from_parts(m: event_entity::Model, images: Vec<event_image_entity::Model>) -> Self {
        Self {
            id: m.id,
            title: m.title,
            slug: m.slug,
            description: m.description,
            location: m.location,
            event_date: m.event_date,
            cover_image_url: m.cover_image_url,
            is_published: m.is_published,
            images: images.into_iter().map(EventImageResponse::from).collect(),
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct EventImageInput {
    pub image_url: String,
    pub caption: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EventQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateEventRequest {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub cover_image_url: Option<String>,
    pub is_published: Option<bool>,
    #[serde(default)]
    pub images: Vec<EventImageInput>,
}

/// images 传入时整体替换相册
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = Date)]
    pub event_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub cover_image_url: Option<Option<String>>,
    pub is_published: Option<bool>,
    pub images: Option<Vec<EventImageInput>>,
}

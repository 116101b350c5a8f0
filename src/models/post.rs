use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A published or draft article. `slug` is derived from `title` and is
/// unique across all posts; a title whose slug collides with an
/// existing post is rejected, never silently suffixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub image: String,
    pub read_time: String,
    pub published: bool,
    /// Dangles once the referenced author is deleted; resolution is the
    /// reader's problem, deletion never cascades.
    pub author_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shallow partial update for a post. Applied identically by every
/// storage backend through [`PostPatch::apply`].
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub read_time: Option<String>,
    pub published: Option<bool>,
    #[serde(deserialize_with = "super::double_option::deserialize")]
    pub author_id: Option<Option<String>>,
}

impl PostPatch {
    /// Merges the present fields into `post`. Does not touch
    /// `updated_at`; the store stamps it at write time.
    pub fn apply(&self, post: &mut Post) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(slug) = &self.slug {
            post.slug = slug.clone();
        }
        if let Some(excerpt) = &self.excerpt {
            post.excerpt = excerpt.clone();
        }
        if let Some(content) = &self.content {
            post.content = content.clone();
        }
        if let Some(category) = &self.category {
            post.category = category.clone();
        }
        if let Some(image) = &self.image {
            post.image = image.clone();
        }
        if let Some(read_time) = &self.read_time {
            post.read_time = read_time.clone();
        }
        if let Some(published) = self.published {
            post.published = published;
        }
        if let Some(author_id) = &self.author_id {
            post.author_id = author_id.clone();
        }
    }
}

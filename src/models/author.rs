use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A content-attribution entity with a public profile page. Unlike
/// posts, a colliding author slug is auto-disambiguated with an
/// epoch-millisecond suffix instead of being rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub avatar: String,
    pub bio: String,
    pub social_links: SocialLinks,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialLinks {
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthorPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub social_links: Option<SocialLinks>,
}

impl AuthorPatch {
    pub fn apply(&self, author: &mut Author) {
        if let Some(name) = &self.name {
            author.name = name.clone();
        }
        if let Some(slug) = &self.slug {
            author.slug = slug.clone();
        }
        if let Some(avatar) = &self.avatar {
            author.avatar = avatar.clone();
        }
        if let Some(bio) = &self.bio {
            author.bio = bio.clone();
        }
        if let Some(social_links) = &self.social_links {
            author.social_links = social_links.clone();
        }
    }
}

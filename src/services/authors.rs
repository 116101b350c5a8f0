use chrono::Utc;
use serde::Deserialize;

use super::ServiceError;
use crate::models::{id, Author, AuthorPatch, SocialLinks};
use crate::slug::slugify;
use crate::App;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthor {
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub social_links: SocialLinks,
}

impl CreateAuthor {
    #[tracing::instrument(skip_all, name = "services.authors.create")]
    pub async fn perform(self, app: &App) -> Result<Author, ServiceError> {
        let slug = unique_slug(app, &self.name, None).await?;

        let now = Utc::now();
        let author = Author {
            id: id::generate(),
            name: self.name,
            slug,
            avatar: self.avatar,
            bio: self.bio,
            social_links: self.social_links,
            created_at: now,
            updated_at: now,
        };

        app.store.insert_author(author).await.map_err(|report| {
            tracing::error!(?report, "could not persist author");
            ServiceError::Failed
        })
    }
}

/// Derives a slug from the display name. A collision with a different
/// author does not reject: the slug gets an epoch-millisecond suffix,
/// which is how author pages have always disambiguated.
async fn unique_slug(app: &App, name: &str, own_id: Option<&str>) -> Result<String, ServiceError> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(ServiceError::InvalidName);
    }

    let existing = app.store.get_author_by_slug(&slug).await.map_err(|report| {
        tracing::error!(?report, "could not check author slug uniqueness");
        ServiceError::Failed
    })?;

    let collides = existing.is_some_and(|other| own_id != Some(other.id.as_str()));
    if collides {
        Ok(format!("{slug}-{}", Utc::now().timestamp_millis()))
    } else {
        Ok(slug)
    }
}

#[derive(Debug)]
pub struct UpdateAuthor {
    pub id: String,
    pub changes: AuthorPatch,
}

impl UpdateAuthor {
    #[tracing::instrument(skip_all, fields(id = %self.id), name = "services.authors.update")]
    pub async fn perform(mut self, app: &App) -> Result<Author, ServiceError> {
        self.changes.slug = None;

        if let Some(name) = self.changes.name.as_deref() {
            self.changes.slug = Some(unique_slug(app, name, Some(&self.id)).await?);
        }

        let updated = app
            .store
            .update_author(&self.id, self.changes)
            .await
            .map_err(|report| {
                tracing::error!(?report, "could not update author");
                ServiceError::Failed
            })?;
        updated.ok_or(ServiceError::NotFound)
    }
}

#[derive(Debug)]
pub struct DeleteAuthor {
    pub id: String,
}

impl DeleteAuthor {
    /// Posts referencing the author keep their `author_id`; the
    /// reference simply stops resolving.
    #[tracing::instrument(skip_all, fields(id = %self.id), name = "services.authors.delete")]
    pub async fn perform(self, app: &App) -> Result<(), ServiceError> {
        let deleted = app.store.delete_author(&self.id).await.map_err(|report| {
            tracing::error!(?report, "could not delete author");
            ServiceError::Failed
        })?;
        if deleted {
            Ok(())
        } else {
            Err(ServiceError::NotFound)
        }
    }
}

#[derive(Debug)]
pub struct GetAuthorBySlug {
    pub slug: String,
}

impl GetAuthorBySlug {
    #[tracing::instrument(skip_all, fields(slug = %self.slug), name = "services.authors.get_by_slug")]
    pub async fn perform(self, app: &App) -> Option<Author> {
        match app.store.get_author_by_slug(&self.slug).await {
            Ok(author) => author,
            Err(report) => {
                tracing::error!(?report, "could not load author by slug");
                None
            }
        }
    }
}

#[derive(Debug)]
pub struct ListAuthors;

impl ListAuthors {
    #[tracing::instrument(skip_all, name = "services.authors.list")]
    pub async fn perform(self, app: &App) -> Vec<Author> {
        match app.store.list_authors().await {
            Ok(authors) => authors,
            Err(report) => {
                tracing::error!(?report, "could not list authors");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    fn create_request(name: &str) -> CreateAuthor {
        CreateAuthor {
            name: name.to_string(),
            avatar: String::new(),
            bio: "Bác sỹ vật lý trị liệu".to_string(),
            social_links: SocialLinks::default(),
        }
    }

    #[tokio::test]
    async fn colliding_names_get_disambiguated_slugs() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_utils::build_test_app(dir.path());

        let first = create_request("Nguyễn Văn A").perform(&app).await.unwrap();
        let second = create_request("Nguyễn Văn A").perform(&app).await.unwrap();

        assert_eq!(first.slug, "nguyen-van-a");
        assert_ne!(second.slug, first.slug);
        assert!(second.slug.starts_with("nguyen-van-a-"));
    }

    #[tokio::test]
    async fn renaming_to_own_slug_keeps_it_stable() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_utils::build_test_app(dir.path());

        let author = create_request("Nguyễn Văn A").perform(&app).await.unwrap();
        let updated = UpdateAuthor {
            id: author.id.clone(),
            changes: serde_json::from_str(r#"{"name": "Nguyễn Văn A"}"#).unwrap(),
        }
        .perform(&app)
        .await
        .unwrap();

        assert_eq!(updated.slug, "nguyen-van-a");
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_utils::build_test_app(dir.path());

        let error = create_request("  ").perform(&app).await.unwrap_err();
        assert_eq!(error, ServiceError::InvalidName);
    }

    #[tokio::test]
    async fn deleting_author_leaves_posts_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_utils::build_test_app(dir.path());

        let author = create_request("Nguyễn Văn A").perform(&app).await.unwrap();
        let post = crate::services::posts::CreatePost {
            title: "Điều trị đau lưng".to_string(),
            excerpt: String::new(),
            content: String::new(),
            category: String::new(),
            image: String::new(),
            read_time: String::new(),
            published: true,
            author_id: Some(author.id.clone()),
        }
        .perform(&app)
        .await
        .unwrap();

        DeleteAuthor { id: author.id.clone() }.perform(&app).await.unwrap();

        let posts = crate::services::posts::ListPosts { published_only: false }
            .perform(&app)
            .await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, post.id);
        assert_eq!(posts[0].author_id.as_deref(), Some(author.id.as_str()));
    }
}

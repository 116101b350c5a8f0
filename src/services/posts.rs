use chrono::Utc;
use serde::Deserialize;

use super::ServiceError;
use crate::models::{id, Post, PostPatch};
use crate::slug::slugify;
use crate::App;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub read_time: String,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub author_id: Option<String>,
}

impl CreatePost {
    #[tracing::instrument(skip_all, name = "services.posts.create")]
    pub async fn perform(self, app: &App) -> Result<Post, ServiceError> {
        let slug = slugify(&self.title);
        if slug.is_empty() {
            return Err(ServiceError::InvalidTitle);
        }

        let existing = app.store.get_post_by_slug(&slug).await.map_err(|report| {
            tracing::error!(?report, "could not check post slug uniqueness");
            ServiceError::Failed
        })?;
        if existing.is_some() {
            return Err(ServiceError::DuplicateSlug);
        }

        let now = Utc::now();
        let post = Post {
            id: id::generate(),
            title: self.title,
            slug,
            excerpt: self.excerpt,
            content: self.content,
            category: self.category,
            image: self.image,
            read_time: self.read_time,
            published: self.published,
            author_id: self.author_id,
            created_at: now,
            updated_at: now,
        };

        app.store.insert_post(post).await.map_err(|report| {
            tracing::error!(?report, "could not persist post");
            ServiceError::Failed
        })
    }
}

#[derive(Debug)]
pub struct UpdatePost {
    pub id: String,
    pub changes: PostPatch,
}

impl UpdatePost {
    #[tracing::instrument(skip_all, fields(id = %self.id), name = "services.posts.update")]
    pub async fn perform(mut self, app: &App) -> Result<Post, ServiceError> {
        // The slug is never taken from the wire; it only changes when
        // the title does.
        self.changes.slug = None;

        if let Some(title) = self.changes.title.as_deref() {
            let slug = slugify(title);
            if slug.is_empty() {
                return Err(ServiceError::InvalidTitle);
            }

            let existing = app.store.get_post_by_slug(&slug).await.map_err(|report| {
                tracing::error!(?report, "could not check post slug uniqueness");
                ServiceError::Failed
            })?;
            if existing.is_some_and(|other| other.id != self.id) {
                return Err(ServiceError::DuplicateSlug);
            }

            self.changes.slug = Some(slug);
        }

        let updated = app
            .store
            .update_post(&self.id, self.changes)
            .await
            .map_err(|report| {
                tracing::error!(?report, "could not update post");
                ServiceError::Failed
            })?;
        updated.ok_or(ServiceError::NotFound)
    }
}

#[derive(Debug)]
pub struct DeletePost {
    pub id: String,
}

impl DeletePost {
    #[tracing::instrument(skip_all, fields(id = %self.id), name = "services.posts.delete")]
    pub async fn perform(self, app: &App) -> Result<(), ServiceError> {
        let deleted = app.store.delete_post(&self.id).await.map_err(|report| {
            tracing::error!(?report, "could not delete post");
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
pub struct GetPostBySlug {
    pub slug: String,
    /// Public reads only see published posts; the back office sees all.
    pub published_only: bool,
}

impl GetPostBySlug {
    #[tracing::instrument(skip_all, fields(slug = %self.slug), name = "services.posts.get_by_slug")]
    pub async fn perform(self, app: &App) -> Option<Post> {
        match app.store.get_post_by_slug(&self.slug).await {
            Ok(post) => post.filter(|p| !self.published_only || p.published),
            Err(report) => {
                tracing::error!(?report, "could not load post by slug");
                None
            }
        }
    }
}

#[derive(Debug)]
pub struct ListPosts {
    pub published_only: bool,
}

impl ListPosts {
    #[tracing::instrument(skip_all, name = "services.posts.list")]
    pub async fn perform(self, app: &App) -> Vec<Post> {
        match app.store.list_posts().await {
            Ok(posts) => {
                if self.published_only {
                    posts.into_iter().filter(|p| p.published).collect()
                } else {
                    posts
                }
            }
            Err(report) => {
                tracing::error!(?report, "could not list posts");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    fn create_request(title: &str) -> CreatePost {
        CreatePost {
            title: title.to_string(),
            excerpt: "Tổng quan".to_string(),
            content: "<p>Nội dung</p>".to_string(),
            category: "Cơ xương khớp".to_string(),
            image: String::new(),
            read_time: "5 phút".to_string(),
            published: true,
            author_id: None,
        }
    }

    #[tokio::test]
    async fn create_derives_slug_from_title() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_utils::build_test_app(dir.path());

        let post = create_request("Điều trị đau lưng").perform(&app).await.unwrap();
        assert_eq!(post.slug, "dieu-tri-dau-lung");
    }

    #[tokio::test]
    async fn duplicate_title_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_utils::build_test_app(dir.path());

        create_request("Điều trị đau lưng").perform(&app).await.unwrap();
        let error = create_request("Điều trị đau lưng")
            .perform(&app)
            .await
            .unwrap_err();
        assert_eq!(error, ServiceError::DuplicateSlug);
    }

    #[tokio::test]
    async fn title_with_no_alphanumeric_content_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_utils::build_test_app(dir.path());

        let error = create_request("!!! ***").perform(&app).await.unwrap_err();
        assert_eq!(error, ServiceError::InvalidTitle);
    }

    #[tokio::test]
    async fn retitling_regenerates_the_slug() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_utils::build_test_app(dir.path());

        let post = create_request("Điều trị đau lưng").perform(&app).await.unwrap();
        let updated = UpdatePost {
            id: post.id.clone(),
            changes: serde_json::from_str(r#"{"title": "Phục hồi chức năng"}"#).unwrap(),
        }
        .perform(&app)
        .await
        .unwrap();

        assert_eq!(updated.title, "Phục hồi chức năng");
        assert_eq!(updated.slug, "phuc-hoi-chuc-nang");
    }

    #[tokio::test]
    async fn retitling_onto_an_existing_slug_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_utils::build_test_app(dir.path());

        create_request("Điều trị đau lưng").perform(&app).await.unwrap();
        let second = create_request("Phục hồi chức năng").perform(&app).await.unwrap();

        let error = UpdatePost {
            id: second.id,
            changes: serde_json::from_str(r#"{"title": "Điều trị đau lưng"}"#).unwrap(),
        }
        .perform(&app)
        .await
        .unwrap_err();
        assert_eq!(error, ServiceError::DuplicateSlug);
    }

    #[tokio::test]
    async fn public_listing_hides_drafts() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_utils::build_test_app(dir.path());

        let mut draft = create_request("Bản nháp");
        draft.published = false;
        draft.perform(&app).await.unwrap();
        create_request("Đã xuất bản").perform(&app).await.unwrap();

        let public = ListPosts { published_only: true }.perform(&app).await;
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].slug, "da-xuat-ban");

        let admin = ListPosts { published_only: false }.perform(&app).await;
        assert_eq!(admin.len(), 2);
    }
}

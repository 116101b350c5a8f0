//! JSON-file record store.
//!
//! One array file per entity under the data directory, fully rewritten
//! on every mutation with no file locking. This backend exists so the
//! site runs without a database in local development; it tolerates no
//! concurrent writer processes and is never the production path.

use async_trait::async_trait;
use chrono::Utc;
use error_stack::{Report, ResultExt};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

use super::{RecordStore, StoreError, StoreResult};
use crate::models::{
    AppSettings, AppSettingsPatch, Author, AuthorPatch, Booking, BookingPatch, Post, PostPatch,
    SeoSettings, SeoSettingsPatch, Subscriber, SubscriberPatch,
};

const POSTS_FILE: &str = "posts.json";
const AUTHORS_FILE: &str = "authors.json";
const BOOKINGS_FILE: &str = "bookings.json";
const SUBSCRIBERS_FILE: &str = "subscribers.json";
const SETTINGS_FILE: &str = "settings.json";

/// Both singleton rows live together in `settings.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SettingsFile {
    seo_settings: Option<SeoSettings>,
    app_settings: Option<AppSettings>,
}

#[derive(Debug)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .change_context(StoreError::Io)
            .attach_printable_lazy(|| format!("data directory: {}", root.display()))?;
        Ok(Self { root })
    }

    fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    async fn read_array<T: DeserializeOwned>(&self, file: &str) -> StoreResult<Vec<T>> {
        read_json_or_default(&self.path(file)).await
    }

    async fn write_array<T: Serialize>(&self, file: &str, rows: &[T]) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(rows).change_context(StoreError::Serialize)?;
        tokio::fs::write(self.path(file), bytes)
            .await
            .change_context(StoreError::Io)
            .attach_printable_lazy(|| format!("file: {file}"))
    }

    async fn read_settings(&self) -> StoreResult<SettingsFile> {
        read_json_or_default(&self.path(SETTINGS_FILE)).await
    }

    async fn write_settings(&self, settings: &SettingsFile) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(settings).change_context(StoreError::Serialize)?;
        tokio::fs::write(self.path(SETTINGS_FILE), bytes)
            .await
            .change_context(StoreError::Io)
    }
}

/// Missing file reads as the empty/default state: the data directory
/// starts out blank and files appear on first write.
async fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> StoreResult<T> {
    match tokio::fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .change_context(StoreError::Malformed)
            .attach_printable_lazy(|| format!("file: {}", path.display())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(Report::new(e)
            .change_context(StoreError::Io)
            .attach_printable(format!("file: {}", path.display()))),
    }
}

#[async_trait]
impl RecordStore for JsonStore {
    #[tracing::instrument(skip_all, name = "json.posts.list")]
    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        let mut rows: Vec<Post> = self.read_array(POSTS_FILE).await?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    #[tracing::instrument(skip_all, name = "json.posts.get")]
    async fn get_post(&self, id: &str) -> StoreResult<Option<Post>> {
        let rows: Vec<Post> = self.read_array(POSTS_FILE).await?;
        Ok(rows.into_iter().find(|p| p.id == id))
    }

    #[tracing::instrument(skip_all, name = "json.posts.get_by_slug")]
    async fn get_post_by_slug(&self, slug: &str) -> StoreResult<Option<Post>> {
        let rows: Vec<Post> = self.read_array(POSTS_FILE).await?;
        Ok(rows.into_iter().find(|p| p.slug == slug))
    }

    #[tracing::instrument(skip_all, name = "json.posts.insert")]
    async fn insert_post(&self, post: Post) -> StoreResult<Post> {
        let mut rows: Vec<Post> = self.read_array(POSTS_FILE).await?;
        rows.push(post.clone());
        self.write_array(POSTS_FILE, &rows).await?;
        Ok(post)
    }

    #[tracing::instrument(skip_all, name = "json.posts.update")]
    async fn update_post(&self, id: &str, patch: PostPatch) -> StoreResult<Option<Post>> {
        let mut rows: Vec<Post> = self.read_array(POSTS_FILE).await?;
        let Some(post) = rows.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        patch.apply(post);
        post.updated_at = Utc::now();
        let updated = post.clone();
        self.write_array(POSTS_FILE, &rows).await?;
        Ok(Some(updated))
    }

    #[tracing::instrument(skip_all, name = "json.posts.delete")]
    async fn delete_post(&self, id: &str) -> StoreResult<bool> {
        let mut rows: Vec<Post> = self.read_array(POSTS_FILE).await?;
        let before = rows.len();
        rows.retain(|p| p.id != id);
        if rows.len() == before {
            return Ok(false);
        }
        self.write_array(POSTS_FILE, &rows).await?;
        Ok(true)
    }

    #[tracing::instrument(skip_all, name = "json.authors.list")]
    async fn list_authors(&self) -> StoreResult<Vec<Author>> {
        let mut rows: Vec<Author> = self.read_array(AUTHORS_FILE).await?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    #[tracing::instrument(skip_all, name = "json.authors.get")]
    async fn get_author(&self, id: &str) -> StoreResult<Option<Author>> {
        let rows: Vec<Author> = self.read_array(AUTHORS_FILE).await?;
        Ok(rows.into_iter().find(|a| a.id == id))
    }

    #[tracing::instrument(skip_all, name = "json.authors.get_by_slug")]
    async fn get_author_by_slug(&self, slug: &str) -> StoreResult<Option<Author>> {
        let rows: Vec<Author> = self.read_array(AUTHORS_FILE).await?;
        Ok(rows.into_iter().find(|a| a.slug == slug))
    }

    #[tracing::instrument(skip_all, name = "json.authors.insert")]
    async fn insert_author(&self, author: Author) -> StoreResult<Author> {
        let mut rows: Vec<Author> = self.read_array(AUTHORS_FILE).await?;
        rows.push(author.clone());
        self.write_array(AUTHORS_FILE, &rows).await?;
        Ok(author)
    }

    #[tracing::instrument(skip_all, name = "json.authors.update")]
    async fn update_author(&self, id: &str, patch: AuthorPatch) -> StoreResult<Option<Author>> {
        let mut rows: Vec<Author> = self.read_array(AUTHORS_FILE).await?;
        let Some(author) = rows.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        patch.apply(author);
        author.updated_at = Utc::now();
        let updated = author.clone();
        self.write_array(AUTHORS_FILE, &rows).await?;
        Ok(Some(updated))
    }

    #[tracing::instrument(skip_all, name = "json.authors.delete")]
    async fn delete_author(&self, id: &str) -> StoreResult<bool> {
        let mut rows: Vec<Author> = self.read_array(AUTHORS_FILE).await?;
        let before = rows.len();
        rows.retain(|a| a.id != id);
        if rows.len() == before {
            return Ok(false);
        }
        self.write_array(AUTHORS_FILE, &rows).await?;
        Ok(true)
    }

    #[tracing::instrument(skip_all, name = "json.bookings.list")]
    async fn list_bookings(&self) -> StoreResult<Vec<Booking>> {
        let mut rows: Vec<Booking> = self.read_array(BOOKINGS_FILE).await?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    #[tracing::instrument(skip_all, name = "json.bookings.get")]
    async fn get_booking(&self, id: &str) -> StoreResult<Option<Booking>> {
        let rows: Vec<Booking> = self.read_array(BOOKINGS_FILE).await?;
        Ok(rows.into_iter().find(|b| b.id == id))
    }

    #[tracing::instrument(skip_all, name = "json.bookings.insert")]
    async fn insert_booking(&self, booking: Booking) -> StoreResult<Booking> {
        let mut rows: Vec<Booking> = self.read_array(BOOKINGS_FILE).await?;
        rows.push(booking.clone());
        self.write_array(BOOKINGS_FILE, &rows).await?;
        Ok(booking)
    }

    #[tracing::instrument(skip_all, name = "json.bookings.update")]
    async fn update_booking(&self, id: &str, patch: BookingPatch) -> StoreResult<Option<Booking>> {
        let mut rows: Vec<Booking> = self.read_array(BOOKINGS_FILE).await?;
        let Some(booking) = rows.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        patch.apply(booking);
        booking.updated_at = Utc::now();
        let updated = booking.clone();
        self.write_array(BOOKINGS_FILE, &rows).await?;
        Ok(Some(updated))
    }

    #[tracing::instrument(skip_all, name = "json.bookings.delete")]
    async fn delete_booking(&self, id: &str) -> StoreResult<bool> {
        let mut rows: Vec<Booking> = self.read_array(BOOKINGS_FILE).await?;
        let before = rows.len();
        rows.retain(|b| b.id != id);
        if rows.len() == before {
            return Ok(false);
        }
        self.write_array(BOOKINGS_FILE, &rows).await?;
        Ok(true)
    }

    #[tracing::instrument(skip_all, name = "json.subscribers.list")]
    async fn list_subscribers(&self) -> StoreResult<Vec<Subscriber>> {
        let mut rows: Vec<Subscriber> = self.read_array(SUBSCRIBERS_FILE).await?;
        rows.sort_by(|a, b| b.subscribed_at.cmp(&a.subscribed_at));
        Ok(rows)
    }

    #[tracing::instrument(skip_all, name = "json.subscribers.get")]
    async fn get_subscriber(&self, id: &str) -> StoreResult<Option<Subscriber>> {
        let rows: Vec<Subscriber> = self.read_array(SUBSCRIBERS_FILE).await?;
        Ok(rows.into_iter().find(|s| s.id == id))
    }

    #[tracing::instrument(skip_all, name = "json.subscribers.get_by_email")]
    async fn get_subscriber_by_email(&self, email: &str) -> StoreResult<Option<Subscriber>> {
        let rows: Vec<Subscriber> = self.read_array(SUBSCRIBERS_FILE).await?;
        Ok(rows.into_iter().find(|s| s.email == email))
    }

    #[tracing::instrument(skip_all, name = "json.subscribers.insert")]
    async fn insert_subscriber(&self, subscriber: Subscriber) -> StoreResult<Subscriber> {
        let mut rows: Vec<Subscriber> = self.read_array(SUBSCRIBERS_FILE).await?;
        rows.push(subscriber.clone());
        self.write_array(SUBSCRIBERS_FILE, &rows).await?;
        Ok(subscriber)
    }

    #[tracing::instrument(skip_all, name = "json.subscribers.update")]
    async fn update_subscriber(
        &self,
        id: &str,
        patch: SubscriberPatch,
    ) -> StoreResult<Option<Subscriber>> {
        let mut rows: Vec<Subscriber> = self.read_array(SUBSCRIBERS_FILE).await?;
        let Some(subscriber) = rows.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        patch.apply(subscriber);
        let updated = subscriber.clone();
        self.write_array(SUBSCRIBERS_FILE, &rows).await?;
        Ok(Some(updated))
    }

    #[tracing::instrument(skip_all, name = "json.subscribers.delete")]
    async fn delete_subscriber(&self, id: &str) -> StoreResult<bool> {
        let mut rows: Vec<Subscriber> = self.read_array(SUBSCRIBERS_FILE).await?;
        let before = rows.len();
        rows.retain(|s| s.id != id);
        if rows.len() == before {
            return Ok(false);
        }
        self.write_array(SUBSCRIBERS_FILE, &rows).await?;
        Ok(true)
    }

    #[tracing::instrument(skip_all, name = "json.settings.seo.get")]
    async fn seo_settings(&self) -> StoreResult<Option<SeoSettings>> {
        Ok(self.read_settings().await?.seo_settings)
    }

    #[tracing::instrument(skip_all, name = "json.settings.seo.put")]
    async fn put_seo_settings(&self, patch: SeoSettingsPatch) -> StoreResult<SeoSettings> {
        let mut settings = self.read_settings().await?;
        let mut row = settings.seo_settings.unwrap_or_else(SeoSettings::default_row);
        patch.apply(&mut row);
        row.updated_at = Utc::now();
        settings.seo_settings = Some(row.clone());
        self.write_settings(&settings).await?;
        Ok(row)
    }

    #[tracing::instrument(skip_all, name = "json.settings.app.get")]
    async fn app_settings(&self) -> StoreResult<Option<AppSettings>> {
        Ok(self.read_settings().await?.app_settings)
    }

    #[tracing::instrument(skip_all, name = "json.settings.app.put")]
    async fn put_app_settings(&self, patch: AppSettingsPatch) -> StoreResult<AppSettings> {
        let mut settings = self.read_settings().await?;
        let mut row = settings.app_settings.unwrap_or_else(AppSettings::default_row);
        patch.apply(&mut row);
        row.updated_at = Utc::now();
        settings.app_settings = Some(row.clone());
        self.write_settings(&settings).await?;
        Ok(row)
    }
}

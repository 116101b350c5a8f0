//! Postgres record store.
//!
//! Parameterized queries over one table per entity (snake_case columns,
//! `social_links` as JSONB, native booleans). Updates repopulate every
//! column from the merged record, mirroring the JSON backend's
//! whole-record rewrite.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use error_stack::{Report, ResultExt};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::FromRow;
use std::str::FromStr;
use std::time::Duration;

use super::{RecordStore, StoreError, StoreResult};
use crate::config;
use crate::models::settings::SINGLETON_ID;
use crate::models::{
    AppSettings, AppSettingsPatch, Author, AuthorPatch, Booking, BookingPatch, BookingStatus, Post,
    PostPatch, SeoSettings, SeoSettingsPatch, SocialLinks, Subscriber, SubscriberPatch,
    SubscriberStatus,
};

/// Idempotent schema, applied at startup. One statement per table so a
/// failure report names the table that broke.
const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS posts (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        slug TEXT NOT NULL UNIQUE,
        excerpt TEXT NOT NULL,
        content TEXT NOT NULL,
        category TEXT NOT NULL,
        image TEXT NOT NULL,
        read_time TEXT NOT NULL,
        published BOOLEAN NOT NULL,
        author_id TEXT,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS authors (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        slug TEXT NOT NULL UNIQUE,
        avatar TEXT NOT NULL,
        bio TEXT NOT NULL,
        social_links JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS bookings (
        id TEXT PRIMARY KEY,
        full_name TEXT NOT NULL,
        phone TEXT NOT NULL,
        email TEXT,
        service TEXT NOT NULL,
        date DATE NOT NULL,
        time TEXT NOT NULL,
        message TEXT,
        status TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS subscribers (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        status TEXT NOT NULL,
        subscribed_at TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS seo_settings (
        id TEXT PRIMARY KEY,
        site_title TEXT NOT NULL,
        site_description TEXT NOT NULL,
        site_keywords TEXT NOT NULL,
        og_image TEXT NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS app_settings (
        id TEXT PRIMARY KEY,
        smtp_host TEXT NOT NULL,
        smtp_port INT NOT NULL,
        smtp_user TEXT NOT NULL,
        smtp_pass TEXT NOT NULL,
        smtp_from TEXT NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )"#,
];

#[derive(Clone)]
pub struct PgStore {
    pool: sqlx::PgPool,
}

impl std::fmt::Debug for PgStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.pool.fmt(f)
    }
}

impl PgStore {
    pub async fn connect(cfg: &config::Database) -> StoreResult<Self> {
        let mut pool_opts = PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(cfg.timeout_secs.get()))
            .max_connections(cfg.pool_size.get());

        if let Some(min_idle) = cfg.min_idle {
            pool_opts = pool_opts.min_connections(min_idle.get());
        }

        let mut connect_opts =
            PgConnectOptions::from_str(cfg.url.as_str()).change_context(StoreError::InvalidUrl)?;

        if cfg.enforce_tls {
            connect_opts = connect_opts.ssl_mode(PgSslMode::Prefer);
        }

        let store = Self {
            pool: pool_opts.connect_lazy_with(connect_opts),
        };
        store.migrate().await?;

        Ok(store)
    }

    /// Pool handle for maintenance outside the trait surface (tests
    /// truncate through this).
    pub fn pool(&self) -> &sqlx::PgPool {
        &self.pool
    }

    #[tracing::instrument(skip_all, name = "db.migrate")]
    async fn migrate(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .change_context(StoreError::Query)
                .attach_printable("could not apply schema")?;
        }
        Ok(())
    }
}

#[derive(FromRow)]
struct AuthorRow {
    id: String,
    name: String,
    slug: String,
    avatar: String,
    bio: String,
    social_links: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AuthorRow {
    fn into_author(self) -> Author {
        Author {
            id: self.id,
            name: self.name,
            slug: self.slug,
            avatar: self.avatar,
            bio: self.bio,
            social_links: serde_json::from_value(self.social_links).unwrap_or_default(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct BookingRow {
    id: String,
    full_name: String,
    phone: String,
    email: Option<String>,
    service: String,
    date: NaiveDate,
    time: String,
    message: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self) -> StoreResult<Booking> {
        let status = BookingStatus::parse(&self.status).ok_or_else(|| {
            Report::new(StoreError::Malformed)
                .attach_printable(format!("unknown booking status: {}", self.status))
        })?;
        Ok(Booking {
            id: self.id,
            full_name: self.full_name,
            phone: self.phone,
            email: self.email,
            service: self.service,
            date: self.date,
            time: self.time,
            message: self.message,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct SubscriberRow {
    id: String,
    email: String,
    status: String,
    subscribed_at: DateTime<Utc>,
}

impl SubscriberRow {
    fn into_subscriber(self) -> StoreResult<Subscriber> {
        let status = SubscriberStatus::parse(&self.status).ok_or_else(|| {
            Report::new(StoreError::Malformed)
                .attach_printable(format!("unknown subscriber status: {}", self.status))
        })?;
        Ok(Subscriber {
            id: self.id,
            email: self.email,
            status,
            subscribed_at: self.subscribed_at,
        })
    }
}

#[derive(FromRow)]
struct AppSettingsRow {
    id: String,
    smtp_host: String,
    smtp_port: i32,
    smtp_user: String,
    smtp_pass: String,
    smtp_from: String,
    updated_at: DateTime<Utc>,
}

impl AppSettingsRow {
    fn into_settings(self) -> StoreResult<AppSettings> {
        let smtp_port = u16::try_from(self.smtp_port).change_context(StoreError::Malformed)?;
        Ok(AppSettings {
            id: self.id,
            smtp_host: self.smtp_host,
            smtp_port,
            smtp_user: self.smtp_user,
            smtp_pass: self.smtp_pass,
            smtp_from: self.smtp_from,
            updated_at: self.updated_at,
        })
    }
}

fn social_links_value(links: &SocialLinks) -> StoreResult<serde_json::Value> {
    serde_json::to_value(links).change_context(StoreError::Serialize)
}

#[async_trait]
impl RecordStore for PgStore {
    #[tracing::instrument(skip_all, name = "db.posts.list")]
    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        sqlx::query_as::<_, Post>(r#"SELECT * FROM posts ORDER BY created_at DESC"#)
            .fetch_all(&self.pool)
            .await
            .change_context(StoreError::Query)
    }

    #[tracing::instrument(skip_all, name = "db.posts.get")]
    async fn get_post(&self, id: &str) -> StoreResult<Option<Post>> {
        sqlx::query_as::<_, Post>(r#"SELECT * FROM posts WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .change_context(StoreError::Query)
    }

    #[tracing::instrument(skip_all, name = "db.posts.get_by_slug")]
    async fn get_post_by_slug(&self, slug: &str) -> StoreResult<Option<Post>> {
        sqlx::query_as::<_, Post>(r#"SELECT * FROM posts WHERE slug = $1"#)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .change_context(StoreError::Query)
    }

    #[tracing::instrument(skip_all, name = "db.posts.insert")]
    async fn insert_post(&self, post: Post) -> StoreResult<Post> {
        sqlx::query(
            r#"INSERT INTO posts
               (id, title, slug, excerpt, content, category, image, read_time,
                published, author_id, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"#,
        )
        .bind(&post.id)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.excerpt)
        .bind(&post.content)
        .bind(&post.category)
        .bind(&post.image)
        .bind(&post.read_time)
        .bind(post.published)
        .bind(&post.author_id)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .change_context(StoreError::Query)?;
        Ok(post)
    }

    #[tracing::instrument(skip_all, name = "db.posts.update")]
    async fn update_post(&self, id: &str, patch: PostPatch) -> StoreResult<Option<Post>> {
        let Some(mut post) = self.get_post(id).await? else {
            return Ok(None);
        };
        patch.apply(&mut post);
        post.updated_at = Utc::now();

        sqlx::query(
            r#"UPDATE posts SET
               title = $2, slug = $3, excerpt = $4, content = $5, category = $6,
               image = $7, read_time = $8, published = $9, author_id = $10,
               created_at = $11, updated_at = $12
               WHERE id = $1"#,
        )
        .bind(&post.id)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.excerpt)
        .bind(&post.content)
        .bind(&post.category)
        .bind(&post.image)
        .bind(&post.read_time)
        .bind(post.published)
        .bind(&post.author_id)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .change_context(StoreError::Query)?;
        Ok(Some(post))
    }

    #[tracing::instrument(skip_all, name = "db.posts.delete")]
    async fn delete_post(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query(r#"DELETE FROM posts WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .change_context(StoreError::Query)?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip_all, name = "db.authors.list")]
    async fn list_authors(&self) -> StoreResult<Vec<Author>> {
        let rows =
            sqlx::query_as::<_, AuthorRow>(r#"SELECT * FROM authors ORDER BY created_at DESC"#)
                .fetch_all(&self.pool)
                .await
                .change_context(StoreError::Query)?;
        Ok(rows.into_iter().map(AuthorRow::into_author).collect())
    }

    #[tracing::instrument(skip_all, name = "db.authors.get")]
    async fn get_author(&self, id: &str) -> StoreResult<Option<Author>> {
        let row = sqlx::query_as::<_, AuthorRow>(r#"SELECT * FROM authors WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .change_context(StoreError::Query)?;
        Ok(row.map(AuthorRow::into_author))
    }

    #[tracing::instrument(skip_all, name = "db.authors.get_by_slug")]
    async fn get_author_by_slug(&self, slug: &str) -> StoreResult<Option<Author>> {
        let row = sqlx::query_as::<_, AuthorRow>(r#"SELECT * FROM authors WHERE slug = $1"#)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .change_context(StoreError::Query)?;
        Ok(row.map(AuthorRow::into_author))
    }

    #[tracing::instrument(skip_all, name = "db.authors.insert")]
    async fn insert_author(&self, author: Author) -> StoreResult<Author> {
        sqlx::query(
            r#"INSERT INTO authors
               (id, name, slug, avatar, bio, social_links, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(&author.id)
        .bind(&author.name)
        .bind(&author.slug)
        .bind(&author.avatar)
        .bind(&author.bio)
        .bind(social_links_value(&author.social_links)?)
        .bind(author.created_at)
        .bind(author.updated_at)
        .execute(&self.pool)
        .await
        .change_context(StoreError::Query)?;
        Ok(author)
    }

    #[tracing::instrument(skip_all, name = "db.authors.update")]
    async fn update_author(&self, id: &str, patch: AuthorPatch) -> StoreResult<Option<Author>> {
        let Some(mut author) = self.get_author(id).await? else {
            return Ok(None);
        };
        patch.apply(&mut author);
        author.updated_at = Utc::now();

        sqlx::query(
            r#"UPDATE authors SET
               name = $2, slug = $3, avatar = $4, bio = $5, social_links = $6,
               created_at = $7, updated_at = $8
               WHERE id = $1"#,
        )
        .bind(&author.id)
        .bind(&author.name)
        .bind(&author.slug)
        .bind(&author.avatar)
        .bind(&author.bio)
        .bind(social_links_value(&author.social_links)?)
        .bind(author.created_at)
        .bind(author.updated_at)
        .execute(&self.pool)
        .await
        .change_context(StoreError::Query)?;
        Ok(Some(author))
    }

    #[tracing::instrument(skip_all, name = "db.authors.delete")]
    async fn delete_author(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query(r#"DELETE FROM authors WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .change_context(StoreError::Query)?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip_all, name = "db.bookings.list")]
    async fn list_bookings(&self) -> StoreResult<Vec<Booking>> {
        let rows =
            sqlx::query_as::<_, BookingRow>(r#"SELECT * FROM bookings ORDER BY created_at DESC"#)
                .fetch_all(&self.pool)
                .await
                .change_context(StoreError::Query)?;
        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    #[tracing::instrument(skip_all, name = "db.bookings.get")]
    async fn get_booking(&self, id: &str) -> StoreResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(r#"SELECT * FROM bookings WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .change_context(StoreError::Query)?;
        row.map(BookingRow::into_booking).transpose()
    }

    #[tracing::instrument(skip_all, name = "db.bookings.insert")]
    async fn insert_booking(&self, booking: Booking) -> StoreResult<Booking> {
        sqlx::query(
            r#"INSERT INTO bookings
               (id, full_name, phone, email, service, date, time, message,
                status, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"#,
        )
        .bind(&booking.id)
        .bind(&booking.full_name)
        .bind(&booking.phone)
        .bind(&booking.email)
        .bind(&booking.service)
        .bind(booking.date)
        .bind(&booking.time)
        .bind(&booking.message)
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await
        .change_context(StoreError::Query)?;
        Ok(booking)
    }

    #[tracing::instrument(skip_all, name = "db.bookings.update")]
    async fn update_booking(&self, id: &str, patch: BookingPatch) -> StoreResult<Option<Booking>> {
        let Some(mut booking) = self.get_booking(id).await? else {
            return Ok(None);
        };
        patch.apply(&mut booking);
        booking.updated_at = Utc::now();

        sqlx::query(
            r#"UPDATE bookings SET
               full_name = $2, phone = $3, email = $4, service = $5, date = $6,
               time = $7, message = $8, status = $9, created_at = $10, updated_at = $11
               WHERE id = $1"#,
        )
        .bind(&booking.id)
        .bind(&booking.full_name)
        .bind(&booking.phone)
        .bind(&booking.email)
        .bind(&booking.service)
        .bind(booking.date)
        .bind(&booking.time)
        .bind(&booking.message)
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await
        .change_context(StoreError::Query)?;
        Ok(Some(booking))
    }

    #[tracing::instrument(skip_all, name = "db.bookings.delete")]
    async fn delete_booking(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query(r#"DELETE FROM bookings WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .change_context(StoreError::Query)?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip_all, name = "db.subscribers.list")]
    async fn list_subscribers(&self) -> StoreResult<Vec<Subscriber>> {
        let rows = sqlx::query_as::<_, SubscriberRow>(
            r#"SELECT * FROM subscribers ORDER BY subscribed_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await
        .change_context(StoreError::Query)?;
        rows.into_iter().map(SubscriberRow::into_subscriber).collect()
    }

    #[tracing::instrument(skip_all, name = "db.subscribers.get")]
    async fn get_subscriber(&self, id: &str) -> StoreResult<Option<Subscriber>> {
        let row = sqlx::query_as::<_, SubscriberRow>(r#"SELECT * FROM subscribers WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .change_context(StoreError::Query)?;
        row.map(SubscriberRow::into_subscriber).transpose()
    }

    #[tracing::instrument(skip_all, name = "db.subscribers.get_by_email")]
    async fn get_subscriber_by_email(&self, email: &str) -> StoreResult<Option<Subscriber>> {
        let row =
            sqlx::query_as::<_, SubscriberRow>(r#"SELECT * FROM subscribers WHERE email = $1"#)
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .change_context(StoreError::Query)?;
        row.map(SubscriberRow::into_subscriber).transpose()
    }

    #[tracing::instrument(skip_all, name = "db.subscribers.insert")]
    async fn insert_subscriber(&self, subscriber: Subscriber) -> StoreResult<Subscriber> {
        sqlx::query(
            r#"INSERT INTO subscribers (id, email, status, subscribed_at)
               VALUES ($1, $2, $3, $4)"#,
        )
        .bind(&subscriber.id)
        .bind(&subscriber.email)
        .bind(subscriber.status.as_str())
        .bind(subscriber.subscribed_at)
        .execute(&self.pool)
        .await
        .change_context(StoreError::Query)?;
        Ok(subscriber)
    }

    #[tracing::instrument(skip_all, name = "db.subscribers.update")]
    async fn update_subscriber(
        &self,
        id: &str,
        patch: SubscriberPatch,
    ) -> StoreResult<Option<Subscriber>> {
        let Some(mut subscriber) = self.get_subscriber(id).await? else {
            return Ok(None);
        };
        patch.apply(&mut subscriber);

        sqlx::query(
            r#"UPDATE subscribers SET email = $2, status = $3, subscribed_at = $4
               WHERE id = $1"#,
        )
        .bind(&subscriber.id)
        .bind(&subscriber.email)
        .bind(subscriber.status.as_str())
        .bind(subscriber.subscribed_at)
        .execute(&self.pool)
        .await
        .change_context(StoreError::Query)?;
        Ok(Some(subscriber))
    }

    #[tracing::instrument(skip_all, name = "db.subscribers.delete")]
    async fn delete_subscriber(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query(r#"DELETE FROM subscribers WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await
            .change_context(StoreError::Query)?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip_all, name = "db.settings.seo.get")]
    async fn seo_settings(&self) -> StoreResult<Option<SeoSettings>> {
        sqlx::query_as::<_, SeoSettings>(r#"SELECT * FROM seo_settings WHERE id = $1"#)
            .bind(SINGLETON_ID)
            .fetch_optional(&self.pool)
            .await
            .change_context(StoreError::Query)
    }

    #[tracing::instrument(skip_all, name = "db.settings.seo.put")]
    async fn put_seo_settings(&self, patch: SeoSettingsPatch) -> StoreResult<SeoSettings> {
        let mut row = self
            .seo_settings()
            .await?
            .unwrap_or_else(SeoSettings::default_row);
        patch.apply(&mut row);
        row.updated_at = Utc::now();

        sqlx::query(
            r#"INSERT INTO seo_settings
               (id, site_title, site_description, site_keywords, og_image, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6)
               ON CONFLICT (id) DO UPDATE SET
               site_title = $2, site_description = $3, site_keywords = $4,
               og_image = $5, updated_at = $6"#,
        )
        .bind(&row.id)
        .bind(&row.site_title)
        .bind(&row.site_description)
        .bind(&row.site_keywords)
        .bind(&row.og_image)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await
        .change_context(StoreError::Query)?;
        Ok(row)
    }

    #[tracing::instrument(skip_all, name = "db.settings.app.get")]
    async fn app_settings(&self) -> StoreResult<Option<AppSettings>> {
        let row = sqlx::query_as::<_, AppSettingsRow>(r#"SELECT * FROM app_settings WHERE id = $1"#)
            .bind(SINGLETON_ID)
            .fetch_optional(&self.pool)
            .await
            .change_context(StoreError::Query)?;
        row.map(AppSettingsRow::into_settings).transpose()
    }

    #[tracing::instrument(skip_all, name = "db.settings.app.put")]
    async fn put_app_settings(&self, patch: AppSettingsPatch) -> StoreResult<AppSettings> {
        let mut row = self
            .app_settings()
            .await?
            .unwrap_or_else(AppSettings::default_row);
        patch.apply(&mut row);
        row.updated_at = Utc::now();

        sqlx::query(
            r#"INSERT INTO app_settings
               (id, smtp_host, smtp_port, smtp_user, smtp_pass, smtp_from, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               ON CONFLICT (id) DO UPDATE SET
               smtp_host = $2, smtp_port = $3, smtp_user = $4, smtp_pass = $5,
               smtp_from = $6, updated_at = $7"#,
        )
        .bind(&row.id)
        .bind(&row.smtp_host)
        .bind(i32::from(row.smtp_port))
        .bind(&row.smtp_user)
        .bind(&row.smtp_pass)
        .bind(&row.smtp_from)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await
        .change_context(StoreError::Query)?;
        Ok(row)
    }
}

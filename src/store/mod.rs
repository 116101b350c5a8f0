//! Dual-backend record store.
//!
//! Every entity gets the same CRUD surface behind [`RecordStore`]; the
//! backend is picked once at startup (Postgres when a database URL is
//! configured, JSON files otherwise) and injected through
//! [`crate::App`]. Both backends return row-identical shapes and share
//! the patch-merge code in [`crate::models`], so update semantics
//! cannot drift between them.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    AppSettings, AppSettingsPatch, Author, AuthorPatch, Booking, BookingPatch, Post, PostPatch,
    SeoSettings, SeoSettingsPatch, Subscriber, SubscriberPatch,
};

mod json;
mod postgres;

pub use json::JsonStore;
pub use postgres::PgStore;

/// Storage related errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// An invalid Postgres connection url.
    #[error("invalid connection url")]
    InvalidUrl,
    /// An error raised while talking to the database.
    #[error("database query failed")]
    Query,
    /// A data file could not be read or written.
    #[error("data file could not be read or written")]
    Io,
    /// A data file or row holds records the current schema cannot read.
    #[error("stored record is malformed")]
    Malformed,
    /// A record could not be serialized for storage.
    #[error("record could not be serialized")]
    Serialize,
}

pub type StoreResult<T> = error_stack::Result<T, StoreError>;

/// Per-entity CRUD, plus the two singleton settings rows.
///
/// Contracts shared by every implementation:
/// - `insert_*` persists a fully-formed entity. Ids and timestamps are
///   assigned by the service layer; the store never generates them.
/// - `update_*` is read-modify-write: fetch the current record, merge
///   the patch, stamp `updated_at`, write the whole merged record back.
///   Two racing updates are last-write-wins at the field level; the
///   lost-update anomaly is a documented property of this system.
/// - `list_*` sorts newest-first by creation time (subscription time
///   for subscribers).
#[async_trait]
pub trait RecordStore: Send + Sync {
    // posts
    async fn list_posts(&self) -> StoreResult<Vec<Post>>;
    async fn get_post(&self, id: &str) -> StoreResult<Option<Post>>;
    async fn get_post_by_slug(&self, slug: &str) -> StoreResult<Option<Post>>;
    async fn insert_post(&self, post: Post) -> StoreResult<Post>;
    async fn update_post(&self, id: &str, patch: PostPatch) -> StoreResult<Option<Post>>;
    async fn delete_post(&self, id: &str) -> StoreResult<bool>;

    // authors
    async fn list_authors(&self) -> StoreResult<Vec<Author>>;
    async fn get_author(&self, id: &str) -> StoreResult<Option<Author>>;
    async fn get_author_by_slug(&self, slug: &str) -> StoreResult<Option<Author>>;
    async fn insert_author(&self, author: Author) -> StoreResult<Author>;
    async fn update_author(&self, id: &str, patch: AuthorPatch) -> StoreResult<Option<Author>>;
    async fn delete_author(&self, id: &str) -> StoreResult<bool>;

    // bookings
    async fn list_bookings(&self) -> StoreResult<Vec<Booking>>;
    async fn get_booking(&self, id: &str) -> StoreResult<Option<Booking>>;
    async fn insert_booking(&self, booking: Booking) -> StoreResult<Booking>;
    async fn update_booking(&self, id: &str, patch: BookingPatch) -> StoreResult<Option<Booking>>;
    async fn delete_booking(&self, id: &str) -> StoreResult<bool>;

    // subscribers
    async fn list_subscribers(&self) -> StoreResult<Vec<Subscriber>>;
    async fn get_subscriber(&self, id: &str) -> StoreResult<Option<Subscriber>>;
    async fn get_subscriber_by_email(&self, email: &str) -> StoreResult<Option<Subscriber>>;
    async fn insert_subscriber(&self, subscriber: Subscriber) -> StoreResult<Subscriber>;
    async fn update_subscriber(
        &self,
        id: &str,
        patch: SubscriberPatch,
    ) -> StoreResult<Option<Subscriber>>;
    async fn delete_subscriber(&self, id: &str) -> StoreResult<bool>;

    // singleton settings rows
    async fn seo_settings(&self) -> StoreResult<Option<SeoSettings>>;
    async fn put_seo_settings(&self, patch: SeoSettingsPatch) -> StoreResult<SeoSettings>;
    async fn app_settings(&self) -> StoreResult<Option<AppSettings>>;
    async fn put_app_settings(&self, patch: AppSettingsPatch) -> StoreResult<AppSettings>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use static_assertions::{assert_impl_all, assert_obj_safe};

    assert_obj_safe!(RecordStore);
    assert_impl_all!(JsonStore: Send, Sync);
    assert_impl_all!(PgStore: Send, Sync);
}

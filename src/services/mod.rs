//! The action layer: one request struct per operation, performed
//! against an [`crate::App`]. Validation and slug generation happen
//! here, ids and timestamps are assigned here, and storage failures are
//! logged here and degraded to soft results so callers never see a
//! backend's internals.

use thiserror::Error;

pub mod authors;
pub mod bookings;
pub mod newsletter;
pub mod posts;
pub mod subscribers;

pub use bookings::BookingRejection;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidBooking(#[from] BookingRejection),
    /// Post title slugifies to nothing or is empty.
    #[error("Tiêu đề bài viết không hợp lệ")]
    InvalidTitle,
    /// Author name slugifies to nothing or is empty.
    #[error("Tên tác giả không hợp lệ")]
    InvalidName,
    #[error("Email không hợp lệ")]
    InvalidEmail,
    /// Another post already owns the slug derived from this title.
    #[error("Đã tồn tại bài viết với tiêu đề này")]
    DuplicateSlug,
    #[error("Email đã được đăng ký nhận tin")]
    AlreadySubscribed,
    #[error("Không tìm thấy dữ liệu")]
    NotFound,
    /// Something below the action layer broke; details are in the
    /// server log, never in the response.
    #[error("Có lỗi xảy ra, vui lòng thử lại sau")]
    Failed,
}

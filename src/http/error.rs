use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::services::ServiceError;

/// Everything a handler can answer with besides a success body. The
/// response is always `{"success": false, "error": "..."}`; internal
/// faults carry the one generic message and nothing else.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    /// One message for unknown username and wrong password alike.
    #[error("Thông tin đăng nhập không đúng")]
    InvalidCredentials,
    #[error("Yêu cầu đăng nhập")]
    Unauthorized,
    #[error("{0}")]
    Conflict(String),
    #[error("Không tìm thấy dữ liệu")]
    NotFound,
    #[error("Có lỗi xảy ra, vui lòng thử lại sau")]
    Internal,
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        match &error {
            ServiceError::InvalidBooking(..)
            | ServiceError::InvalidTitle
            | ServiceError::InvalidName
            | ServiceError::InvalidEmail => Self::BadRequest(error.to_string()),
            ServiceError::DuplicateSlug | ServiceError::AlreadySubscribed => {
                Self::Conflict(error.to_string())
            }
            ServiceError::NotFound => Self::NotFound,
            ServiceError::Failed => Self::Internal,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(..) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Conflict(..) => StatusCode::CONFLICT,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": self.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::BookingRejection;

    #[test]
    fn service_errors_map_to_statuses() {
        let cases = [
            (
                ApiError::from(ServiceError::InvalidBooking(BookingRejection::InvalidPhone)),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::from(ServiceError::DuplicateSlug), StatusCode::CONFLICT),
            (ApiError::from(ServiceError::NotFound), StatusCode::NOT_FOUND),
            (
                ApiError::from(ServiceError::Failed),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.status_code(), status);
        }
    }

    #[test]
    fn internal_error_message_stays_generic() {
        let error = ApiError::from(ServiceError::Failed);
        assert_eq!(error.to_string(), "Có lỗi xảy ra, vui lòng thử lại sau");
    }
}

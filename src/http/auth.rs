use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::Cookie;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse};
use futures::future::{ready, Ready};
use serde::Deserialize;
use serde_json::json;

use super::error::ApiError;
use crate::auth;
use crate::util::Sensitive;
use crate::App;

pub const SESSION_COOKIE: &str = "admin_session";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: Sensitive<String>,
}

pub async fn login(
    app: web::Data<App>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    if !auth::verify_credentials(&app.config.auth, &request.username, request.password.as_str()) {
        return Err(ApiError::InvalidCredentials);
    }

    let token = auth::create_session(&app.config.auth, &request.username).map_err(|report| {
        tracing::error!(?report, "could not issue admin session");
        ApiError::Internal
    })?;

    let ttl_hours = app.config.auth.session_ttl_hours.get();
    let cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .max_age(CookieDuration::hours(ttl_hours as i64))
        .finish();

    Ok(HttpResponse::Ok().cookie(cookie).json(json!({ "success": true })))
}

pub async fn logout() -> HttpResponse {
    let cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .max_age(CookieDuration::ZERO)
        .finish();

    HttpResponse::Ok().cookie(cookie).json(json!({ "success": true }))
}

/// Typed proof that the request carries a valid admin session cookie.
/// Every `/api/admin/*` handler (and the upload relay) takes one.
pub struct AdminSession;

impl FromRequest for AdminSession {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let valid = req.app_data::<web::Data<App>>().is_some_and(|app| {
            req.cookie(SESSION_COOKIE)
                .map(|cookie| auth::validate_session(&app.config.auth, cookie.value()))
                .unwrap_or(false)
        });

        ready(if valid {
            Ok(AdminSession)
        } else {
            Err(ApiError::Unauthorized)
        })
    }
}

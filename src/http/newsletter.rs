use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use super::auth::AdminSession;
use super::error::ApiError;
use crate::services::newsletter::SendNewsletter;
use crate::services::subscribers::{ListSubscribers, Subscribe, Unsubscribe};
use crate::App;

pub async fn subscribe(
    app: web::Data<App>,
    request: web::Json<Subscribe>,
) -> Result<HttpResponse, ApiError> {
    request.into_inner().perform(&app).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct UnsubscribeQuery {
    pub id: String,
}

/// Landing page for the unsubscribe link in every newsletter; answers
/// with a tiny human-readable page since it opens in a browser.
pub async fn unsubscribe(
    app: web::Data<App>,
    query: web::Query<UnsubscribeQuery>,
) -> Result<HttpResponse, ApiError> {
    Unsubscribe {
        id: query.into_inner().id,
    }
    .perform(&app)
    .await?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body("<html><body><p>Bạn đã hủy đăng ký nhận tin thành công.</p></body></html>"))
}

pub async fn admin_list(_session: AdminSession, app: web::Data<App>) -> HttpResponse {
    HttpResponse::Ok().json(ListSubscribers.perform(&app).await)
}

/// Kicks off the broadcast and blocks until the subscriber list has
/// been walked; the report includes per-recipient failures.
pub async fn send(
    _session: AdminSession,
    app: web::Data<App>,
    request: web::Json<SendNewsletter>,
) -> Result<HttpResponse, ApiError> {
    let report = request.into_inner().perform(&app).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "sentCount": report.sent_count,
        "totalCount": report.total_count,
        "errors": report.errors,
    })))
}

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use super::auth::AdminSession;
use super::error::ApiError;
use crate::models::BookingStatus;
use crate::services::bookings::{DeleteBooking, ListBookings, SubmitBooking, UpdateBookingStatus};
use crate::App;

/// Public booking submission. The response is not sent until every
/// notification attempt has resolved.
pub async fn submit(
    app: web::Data<App>,
    request: web::Json<SubmitBooking>,
) -> Result<HttpResponse, ApiError> {
    let booking = request.into_inner().perform(&app).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": { "id": booking.id } })))
}

pub async fn admin_list(_session: AdminSession, app: web::Data<App>) -> HttpResponse {
    HttpResponse::Ok().json(ListBookings.perform(&app).await)
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: BookingStatus,
}

pub async fn update_status(
    _session: AdminSession,
    app: web::Data<App>,
    id: web::Path<String>,
    request: web::Json<StatusRequest>,
) -> Result<HttpResponse, ApiError> {
    let booking = UpdateBookingStatus {
        id: id.into_inner(),
        status: request.status,
    }
    .perform(&app)
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": booking })))
}

pub async fn delete(
    _session: AdminSession,
    app: web::Data<App>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    DeleteBooking {
        id: id.into_inner(),
    }
    .perform(&app)
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

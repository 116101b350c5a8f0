use actix_web::{web, HttpResponse};
use serde_json::json;

use super::auth::AdminSession;
use super::error::ApiError;
use crate::models::AuthorPatch;
use crate::services::authors::{
    CreateAuthor, DeleteAuthor, GetAuthorBySlug, ListAuthors, UpdateAuthor,
};
use crate::App;

pub async fn list_all(app: web::Data<App>) -> HttpResponse {
    HttpResponse::Ok().json(ListAuthors.perform(&app).await)
}

pub async fn get_by_slug(
    app: web::Data<App>,
    slug: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    GetAuthorBySlug {
        slug: slug.into_inner(),
    }
    .perform(&app)
    .await
    .map(|author| HttpResponse::Ok().json(author))
    .ok_or(ApiError::NotFound)
}

pub async fn admin_list(_session: AdminSession, app: web::Data<App>) -> HttpResponse {
    HttpResponse::Ok().json(ListAuthors.perform(&app).await)
}

pub async fn create(
    _session: AdminSession,
    app: web::Data<App>,
    request: web::Json<CreateAuthor>,
) -> Result<HttpResponse, ApiError> {
    let author = request.into_inner().perform(&app).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": author })))
}

pub async fn update(
    _session: AdminSession,
    app: web::Data<App>,
    id: web::Path<String>,
    request: web::Json<AuthorPatch>,
) -> Result<HttpResponse, ApiError> {
    let author = UpdateAuthor {
        id: id.into_inner(),
        changes: request.into_inner(),
    }
    .perform(&app)
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": author })))
}

pub async fn delete(
    _session: AdminSession,
    app: web::Data<App>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    DeleteAuthor {
        id: id.into_inner(),
    }
    .perform(&app)
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

use actix_web::{web, HttpResponse};
use serde_json::json;

use super::auth::AdminSession;
use super::error::ApiError;
use crate::models::PostPatch;
use crate::services::posts::{CreatePost, DeletePost, GetPostBySlug, ListPosts, UpdatePost};
use crate::App;

pub async fn list_published(app: web::Data<App>) -> HttpResponse {
    let posts = ListPosts {
        published_only: true,
    }
    .perform(&app)
    .await;
    HttpResponse::Ok().json(posts)
}

pub async fn get_published(
    app: web::Data<App>,
    slug: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    GetPostBySlug {
        slug: slug.into_inner(),
        published_only: true,
    }
    .perform(&app)
    .await
    .map(|post| HttpResponse::Ok().json(post))
    .ok_or(ApiError::NotFound)
}

pub async fn admin_list(_session: AdminSession, app: web::Data<App>) -> HttpResponse {
    let posts = ListPosts {
        published_only: false,
    }
    .perform(&app)
    .await;
    HttpResponse::Ok().json(posts)
}

pub async fn create(
    _session: AdminSession,
    app: web::Data<App>,
    request: web::Json<CreatePost>,
) -> Result<HttpResponse, ApiError> {
    let post = request.into_inner().perform(&app).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": post })))
}

pub async fn update(
    _session: AdminSession,
    app: web::Data<App>,
    id: web::Path<String>,
    request: web::Json<PostPatch>,
) -> Result<HttpResponse, ApiError> {
    let post = UpdatePost {
        id: id.into_inner(),
        changes: request.into_inner(),
    }
    .perform(&app)
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": post })))
}

pub async fn delete(
    _session: AdminSession,
    app: web::Data<App>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    DeletePost {
        id: id.into_inner(),
    }
    .perform(&app)
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

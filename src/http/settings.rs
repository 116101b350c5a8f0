use actix_web::{web, HttpResponse};

use super::auth::AdminSession;
use super::error::ApiError;
use crate::models::{AppSettings, AppSettingsPatch, SeoSettings, SeoSettingsPatch};
use crate::App;

/// Serves the singleton SEO row, falling back to the built-in defaults
/// when nothing has been saved yet.
pub async fn get_seo(_session: AdminSession, app: web::Data<App>) -> HttpResponse {
    let settings = match app.store.seo_settings().await {
        Ok(Some(settings)) => settings,
        Ok(None) => SeoSettings::default_row(),
        Err(report) => {
            tracing::error!(?report, "could not load seo settings");
            SeoSettings::default_row()
        }
    };
    HttpResponse::Ok().json(settings)
}

/// Partial merge upsert; responds with the full merged row.
pub async fn put_seo(
    _session: AdminSession,
    app: web::Data<App>,
    request: web::Json<SeoSettingsPatch>,
) -> Result<HttpResponse, ApiError> {
    let settings = app
        .store
        .put_seo_settings(request.into_inner())
        .await
        .map_err(|report| {
            tracing::error!(?report, "could not save seo settings");
            ApiError::Internal
        })?;
    Ok(HttpResponse::Ok().json(settings))
}

pub async fn get_smtp(_session: AdminSession, app: web::Data<App>) -> HttpResponse {
    let settings = match app.store.app_settings().await {
        Ok(Some(settings)) => settings,
        Ok(None) => AppSettings::default_row(),
        Err(report) => {
            tracing::error!(?report, "could not load smtp settings");
            AppSettings::default_row()
        }
    };
    HttpResponse::Ok().json(settings)
}

pub async fn put_smtp(
    _session: AdminSession,
    app: web::Data<App>,
    request: web::Json<AppSettingsPatch>,
) -> Result<HttpResponse, ApiError> {
    let settings = app
        .store
        .put_app_settings(request.into_inner())
        .await
        .map_err(|report| {
            tracing::error!(?report, "could not save smtp settings");
            ApiError::Internal
        })?;
    Ok(HttpResponse::Ok().json(settings))
}

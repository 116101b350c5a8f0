use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures::TryStreamExt;
use serde_json::json;
use url::Url;

use super::auth::AdminSession;
use super::error::ApiError;
use crate::App;

/// Accepts one image from a multipart `file` field, stores it in blob
/// storage when a write token is configured or on local disk otherwise,
/// and answers with the public URL.
pub async fn upload(
    _session: AdminSession,
    app: web::Data<App>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|_| bad_request("Dữ liệu tải lên không hợp lệ"))?
    {
        if field.name() != "file" {
            continue;
        }

        let content_type = match field.content_type() {
            Some(mime) if is_allowed_image(mime) => mime.essence_str().to_string(),
            _ => return Err(bad_request("Định dạng tệp không được hỗ trợ")),
        };

        let original = field
            .content_disposition()
            .get_filename()
            .unwrap_or("upload")
            .to_string();
        let filename = format!("{}-{}", Utc::now().timestamp_millis(), sanitize(&original));

        let max_size = app.config.uploads.max_size_bytes;
        let mut data = web::BytesMut::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|_| bad_request("Dữ liệu tải lên không hợp lệ"))?
        {
            if data.len() + chunk.len() > max_size {
                return Err(bad_request("Tệp vượt quá dung lượng cho phép"));
            }
            data.extend_from_slice(&chunk);
        }

        let url = match app.config.uploads.blob() {
            Some((endpoint, token)) => {
                put_blob(endpoint, token, &filename, &content_type, &data).await?
            }
            None => store_local(&app, &filename, &data).await?,
        };

        return Ok(HttpResponse::Ok().json(json!({ "url": url, "filename": filename })));
    }

    Err(bad_request("Thiếu tệp tải lên"))
}

fn bad_request(message: &str) -> ApiError {
    ApiError::BadRequest(message.to_string())
}

fn is_allowed_image(content_type: &mime::Mime) -> bool {
    content_type.type_() == mime::IMAGE
        && matches!(content_type.subtype().as_str(), "jpeg" | "png" | "webp" | "gif")
}

/// Keeps `[A-Za-z0-9._-]`, folds the rest to hyphens. The stored name
/// is additionally timestamp-prefixed, so collisions are the client's
/// to create and ours to survive.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

async fn store_local(app: &App, filename: &str, data: &[u8]) -> Result<String, ApiError> {
    let dir = &app.config.uploads.dir;
    tokio::fs::create_dir_all(dir).await.map_err(|error| {
        tracing::error!(%error, "could not create the uploads directory");
        ApiError::Internal
    })?;
    tokio::fs::write(dir.join(filename), data)
        .await
        .map_err(|error| {
            tracing::error!(%error, "could not write the uploaded file");
            ApiError::Internal
        })?;

    Ok(format!(
        "{}/uploads/{}",
        app.config.http.public_url.as_str().trim_end_matches('/'),
        filename
    ))
}

async fn put_blob(
    endpoint: &Url,
    token: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> Result<String, ApiError> {
    let target = format!("{}/{}", endpoint.as_str().trim_end_matches('/'), filename);

    let response = reqwest::Client::new()
        .put(&target)
        .bearer_auth(token)
        .header(reqwest::header::CONTENT_TYPE, content_type)
        .body(data.to_vec())
        .send()
        .await
        .map_err(|error| {
            tracing::error!(%error, "blob upload request failed");
            ApiError::Internal
        })?;

    if !response.status().is_success() {
        tracing::error!(status = %response.status(), "blob storage rejected the upload");
        return Err(ApiError::Internal);
    }

    // The storage service echoes the public URL in its JSON body; the
    // PUT target is the fallback when it does not.
    let url = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| body.get("url").and_then(|u| u.as_str()).map(String::from))
        .unwrap_or(target);

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(sanitize("chân dung bác sỹ.jpg"), "ch-n-dung-b-c-s-.jpg");
        assert_eq!(sanitize("x-ray_01.png"), "x-ray_01.png");
        assert_eq!(sanitize(""), "upload");
    }

    #[test]
    fn image_allowlist() {
        assert!(is_allowed_image(&mime::IMAGE_JPEG));
        assert!(is_allowed_image(&mime::IMAGE_PNG));
        assert!(is_allowed_image(&"image/webp".parse().unwrap()));
        assert!(!is_allowed_image(&mime::APPLICATION_PDF));
        assert!(!is_allowed_image(&"image/svg+xml".parse().unwrap()));
    }
}

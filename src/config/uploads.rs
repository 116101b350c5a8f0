use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

use crate::util::Sensitive;

/// Where uploaded images land. A configured blob endpoint + token
/// routes files to HTTP blob storage; otherwise they are written to
/// the local uploads directory and served from `/uploads`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Uploads {
    /// **Environment variables**: `KINESA_UPLOADS_DIR`
    pub dir: PathBuf,
    /// **Environment variables**: `KINESA_UPLOADS_MAX_SIZE_BYTES`
    pub max_size_bytes: usize,
    /// **Environment variables**: `KINESA_UPLOADS_BLOB_ENDPOINT`
    pub blob_endpoint: Option<Url>,
    /// **Environment variables**:
    /// `KINESA_UPLOADS_BLOB_TOKEN` or `BLOB_READ_WRITE_TOKEN`
    pub blob_token: Option<Sensitive<String>>,
}

impl Uploads {
    const DEFAULT_MAX_SIZE_BYTES: usize = 5 * 1024 * 1024;

    /// Blob storage is active only when both the endpoint and the
    /// write token are present.
    pub fn blob(&self) -> Option<(&Url, &str)> {
        match (&self.blob_endpoint, &self.blob_token) {
            (Some(endpoint), Some(token)) => Some((endpoint, token.as_str())),
            _ => None,
        }
    }
}

impl Default for Uploads {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("public/uploads"),
            max_size_bytes: Self::DEFAULT_MAX_SIZE_BYTES,
            blob_endpoint: None,
            blob_token: None,
        }
    }
}

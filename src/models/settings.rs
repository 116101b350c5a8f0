use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Both settings entities are singleton rows keyed by this id.
pub const SINGLETON_ID: &str = "default";

/// Site-wide SEO metadata edited from the back office.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SeoSettings {
    pub id: String,
    pub site_title: String,
    pub site_description: String,
    pub site_keywords: String,
    pub og_image: String,
    pub updated_at: DateTime<Utc>,
}

impl SeoSettings {
    /// The row served before an admin has ever saved one.
    pub fn default_row() -> Self {
        Self {
            id: SINGLETON_ID.to_string(),
            site_title: "Phòng khám Vật lý trị liệu".to_string(),
            site_description: "Phòng khám vật lý trị liệu và phục hồi chức năng".to_string(),
            site_keywords: "vật lý trị liệu, phục hồi chức năng".to_string(),
            og_image: String::new(),
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeoSettingsPatch {
    pub site_title: Option<String>,
    pub site_description: Option<String>,
    pub site_keywords: Option<String>,
    pub og_image: Option<String>,
}

impl SeoSettingsPatch {
    pub fn apply(&self, settings: &mut SeoSettings) {
        if let Some(site_title) = &self.site_title {
            settings.site_title = site_title.clone();
        }
        if let Some(site_description) = &self.site_description {
            settings.site_description = site_description.clone();
        }
        if let Some(site_keywords) = &self.site_keywords {
            settings.site_keywords = site_keywords.clone();
        }
        if let Some(og_image) = &self.og_image {
            settings.og_image = og_image.clone();
        }
    }
}

/// Persisted SMTP account used when the environment does not configure
/// one. Edited from the back office alongside the newsletter composer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub id: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub smtp_from: String,
    pub updated_at: DateTime<Utc>,
}

impl AppSettings {
    pub fn default_row() -> Self {
        Self {
            id: SINGLETON_ID.to_string(),
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_user: String::new(),
            smtp_pass: String::new(),
            smtp_from: String::new(),
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettingsPatch {
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
    pub smtp_from: Option<String>,
}

impl AppSettingsPatch {
    pub fn apply(&self, settings: &mut AppSettings) {
        if let Some(smtp_host) = &self.smtp_host {
            settings.smtp_host = smtp_host.clone();
        }
        if let Some(smtp_port) = self.smtp_port {
            settings.smtp_port = smtp_port;
        }
        if let Some(smtp_user) = &self.smtp_user {
            settings.smtp_user = smtp_user.clone();
        }
        if let Some(smtp_pass) = &self.smtp_pass {
            settings.smtp_pass = smtp_pass.clone();
        }
        if let Some(smtp_from) = &self.smtp_from {
            settings.smtp_from = smtp_from.clone();
        }
    }
}

use error_stack::{Report, Result, ResultExt};
use regex::Regex;
use serde::Deserialize;
use std::num::NonZeroU64;
use std::path::PathBuf;
use url::Url;

use super::ParseError;
use crate::util::Sensitive;

/// Root server configuration, loaded once at startup and carried in
/// [`crate::App`] behind an `Arc`; nothing fetches configuration ad
/// hoc after boot.
#[derive(Debug, Deserialize)]
pub struct Server {
    #[serde(default)]
    pub http: Http,
    /// Present iff a database URL is configured; its presence selects
    /// the Postgres record store over the JSON-file fallback.
    #[serde(default)]
    pub db: Option<super::Database>,
    /// Root of the JSON-file record store.
    ///
    /// **Environment variables**: `KINESA_DATA_DIR`
    #[serde(default = "Server::default_data_dir")]
    pub data_dir: PathBuf,
    pub auth: Auth,
    #[serde(default)]
    pub smtp: super::Smtp,
    #[serde(default)]
    pub booking: super::Booking,
    #[serde(default)]
    pub newsletter: super::Newsletter,
    #[serde(default)]
    pub uploads: super::Uploads,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Http {
    /// **Environment variables**: `KINESA_HTTP_BIND`
    pub bind: String,
    /// Base URL used to build absolute links in emails and upload
    /// responses.
    ///
    /// **Environment variables**: `KINESA_HTTP_PUBLIC_URL`
    pub public_url: Url,
}

impl Default for Http {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            public_url: Url::parse("http://localhost:3000").expect("parse default public url"),
        }
    }
}

/// The single back-office identity and the session signing key. Both
/// secrets are required: the server refuses to boot with an empty
/// password or an undersized signing key.
#[derive(Debug, Deserialize)]
pub struct Auth {
    /// **Environment variables**: `KINESA_AUTH_USERNAME`
    #[serde(default = "Auth::default_username")]
    pub username: String,
    /// **Environment variables**: `KINESA_AUTH_PASSWORD`
    pub password: Sensitive<String>,
    /// Key the session tokens are signed with.
    ///
    /// **Environment variables**: `KINESA_AUTH_SESSION_SECRET`
    pub session_secret: Sensitive<String>,
    /// **Environment variables**: `KINESA_AUTH_SESSION_TTL_HOURS`
    #[serde(default = "Auth::default_session_ttl_hours")]
    pub session_ttl_hours: NonZeroU64,
}

impl Auth {
    const DEFAULT_SESSION_TTL_HOURS: u64 = 24;

    fn default_username() -> String {
        "admin".to_string()
    }

    // Required by serde
    const fn default_session_ttl_hours() -> NonZeroU64 {
        match NonZeroU64::new(Self::DEFAULT_SESSION_TTL_HOURS) {
            Some(n) => n,
            None => panic!("DEFAULT_SESSION_TTL_HOURS is accidentally set to 0"),
        }
    }
}

impl Server {
    const MIN_SESSION_SECRET_LEN: usize = 12;

    pub fn load() -> Result<Self, ParseError> {
        dotenvy::dotenv().ok();

        let config = Self::figment()
            .extract::<Self>()
            .change_context(ParseError)?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ParseError> {
        if self.auth.password.as_str().is_empty() {
            return Err(Report::new(ParseError).attach_printable("auth.password must not be empty"));
        }
        if self.auth.session_secret.as_str().len() < Self::MIN_SESSION_SECRET_LEN {
            return Err(Report::new(ParseError).attach_printable(format!(
                "auth.session_secret must be at least {} characters",
                Self::MIN_SESSION_SECRET_LEN
            )));
        }
        Regex::new(&self.booking.phone_pattern)
            .change_context(ParseError)
            .attach_printable("booking.phone_pattern is not a valid regular expression")?;
        Ok(())
    }

    fn default_data_dir() -> PathBuf {
        PathBuf::from("data")
    }
}

impl Server {
    const DEFAULT_CONFIG_FILE: &'static str = "kinesa.toml";

    /// Creates the default [`figment::Figment`] used to load server
    /// configuration. Split out for testing.
    pub(crate) fn figment() -> figment::Figment {
        use figment::{
            providers::{Env, Format, Toml},
            Figment,
        };

        Figment::new()
            .merge(Toml::file(Self::DEFAULT_CONFIG_FILE))
            // The env provider splits on every underscore, so field
            // names that contain one need an explicit mapping.
            .merge(Env::prefixed("KINESA_").map(|v| match v.as_str() {
                "DATA_DIR" => "data_dir".into(),

                "DB_URL" => "db.url".into(),
                "DB_POOL_SIZE" => "db.pool_size".into(),
                "DB_MIN_IDLE" => "db.min_idle".into(),
                "DB_TIMEOUT_SECS" => "db.timeout_secs".into(),
                "DB_ENFORCE_TLS" => "db.enforce_tls".into(),

                "HTTP_PUBLIC_URL" => "http.public_url".into(),

                "AUTH_SESSION_SECRET" => "auth.session_secret".into(),
                "AUTH_SESSION_TTL_HOURS" => "auth.session_ttl_hours".into(),

                "BOOKING_PHONE_PATTERN" => "booking.phone_pattern".into(),
                "BOOKING_ADMIN_EMAILS" => "booking.admin_emails".into(),

                "NEWSLETTER_SEND_DELAY_MS" => "newsletter.send_delay_ms".into(),

                "UPLOADS_MAX_SIZE_BYTES" => "uploads.max_size_bytes".into(),
                "UPLOADS_BLOB_ENDPOINT" => "uploads.blob_endpoint".into(),
                "UPLOADS_BLOB_TOKEN" => "uploads.blob_token".into(),

                _ => v.as_str().replace('_', ".").into(),
            }))
            // Environment variable aliases
            .merge(
                Env::raw()
                    .only(&[
                        "DATABASE_URL",
                        "BLOB_READ_WRITE_TOKEN",
                        "SMTP_HOST",
                        "SMTP_PORT",
                        "SMTP_USER",
                        "SMTP_PASS",
                        "SMTP_FROM",
                    ])
                    .map(|v| match v.as_str() {
                        "DATABASE_URL" => "db.url".into(),
                        "BLOB_READ_WRITE_TOKEN" => "uploads.blob_token".into(),
                        "SMTP_HOST" => "smtp.host".into(),
                        "SMTP_PORT" => "smtp.port".into(),
                        "SMTP_USER" => "smtp.username".into(),
                        "SMTP_PASS" => "smtp.password".into(),
                        "SMTP_FROM" => "smtp.from".into(),
                        _ => v.into(),
                    }),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use std::num::NonZeroU32;

    #[test]
    fn env_aliases() {
        Jail::expect_with(|jail| {
            jail.set_env("KINESA_AUTH_PASSWORD", "letmein-123456");
            jail.set_env("KINESA_AUTH_SESSION_SECRET", "0123456789abcdef");

            jail.set_env("DATABASE_URL", "postgres://localhost/kinesa");
            jail.set_env("KINESA_DB_POOL_SIZE", "12");
            jail.set_env("SMTP_HOST", "smtp.example.com");
            jail.set_env("SMTP_USER", "mailer@clinic.vn");
            jail.set_env("BLOB_READ_WRITE_TOKEN", "blob-token");
            jail.set_env("KINESA_BOOKING_ADMIN_EMAILS", "a@clinic.vn,b@clinic.vn");

            let config: Server = Server::figment().extract()?;

            let db = config.db.as_ref().unwrap();
            assert_eq!(db.url.as_str(), "postgres://localhost/kinesa");
            assert_eq!(db.pool_size, NonZeroU32::new(12).unwrap());

            assert_eq!(config.smtp.host, "smtp.example.com");
            assert_eq!(config.smtp.username, "mailer@clinic.vn");
            assert_eq!(config.smtp.from_or_username(), "mailer@clinic.vn");

            assert_eq!(
                config.uploads.blob_token.as_ref().unwrap().as_str(),
                "blob-token"
            );
            assert_eq!(
                config.booking.admin_recipients(),
                vec!["a@clinic.vn", "b@clinic.vn"]
            );

            Ok(())
        });
    }

    #[test]
    fn defaults_without_database() {
        Jail::expect_with(|jail| {
            jail.set_env("KINESA_AUTH_PASSWORD", "letmein-123456");
            jail.set_env("KINESA_AUTH_SESSION_SECRET", "0123456789abcdef");

            let config: Server = Server::figment().extract()?;

            assert!(config.db.is_none());
            assert!(!config.smtp.is_configured());
            assert_eq!(config.data_dir, PathBuf::from("data"));
            assert_eq!(config.auth.username, "admin");
            assert_eq!(config.auth.session_ttl_hours.get(), 24);
            assert_eq!(
                config.booking.phone_pattern,
                crate::util::validation::DEFAULT_PHONE_PATTERN
            );

            Ok(())
        });
    }

    #[test]
    fn rejects_undersized_session_secret() {
        Jail::expect_with(|jail| {
            jail.set_env("KINESA_AUTH_PASSWORD", "letmein-123456");
            jail.set_env("KINESA_AUTH_SESSION_SECRET", "short");

            let config: Server = Server::figment().extract()?;
            assert!(config.validate().is_err());

            Ok(())
        });
    }
}

use error_stack::{Result, ResultExt};
use regex::Regex;
use std::sync::Arc;
use thiserror::Error;

use crate::config;
use crate::mailer::{MailTransport, SmtpMailer};
use crate::store::{JsonStore, PgStore, RecordStore};

/// Everything a request handler needs, assembled once at startup.
/// Backend selection happens here and only here: handlers and services
/// see one [`RecordStore`] and one [`MailTransport`].
#[derive(Clone)]
pub struct App {
    pub config: Arc<config::Server>,
    pub store: Arc<dyn RecordStore>,
    pub mailer: Arc<dyn MailTransport>,
    /// `booking.phone_pattern`, compiled once.
    pub booking_phone: Regex,
}

#[derive(Debug, Error)]
#[error("Failed to initialize App struct")]
pub struct AppError;

impl App {
    #[tracing::instrument(skip_all)]
    pub async fn new(cfg: config::Server) -> Result<Self, AppError> {
        let store: Arc<dyn RecordStore> = match cfg.db.as_ref() {
            Some(db) => {
                tracing::info!("using the postgres record store");
                Arc::new(PgStore::connect(db).await.change_context(AppError)?)
            }
            None => {
                tracing::info!(
                    dir = %cfg.data_dir.display(),
                    "no database configured, using the json record store"
                );
                Arc::new(JsonStore::open(&cfg.data_dir).change_context(AppError)?)
            }
        };

        let mailer = Arc::new(SmtpMailer::new(cfg.smtp.clone(), store.clone()));
        Self::assemble(cfg, store, mailer)
    }

    /// Wires an [`App`] from pre-built parts. Tests go through this to
    /// inject a scratch store and a recording mail transport.
    pub fn assemble(
        cfg: config::Server,
        store: Arc<dyn RecordStore>,
        mailer: Arc<dyn MailTransport>,
    ) -> Result<Self, AppError> {
        let booking_phone = Regex::new(&cfg.booking.phone_pattern)
            .change_context(AppError)
            .attach_printable("booking.phone_pattern is not a valid regular expression")?;

        Ok(Self {
            config: Arc::new(cfg),
            store,
            mailer,
            booking_phone,
        })
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App").field("config", &self.config).finish()
    }
}

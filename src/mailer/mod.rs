//! Notification dispatch.
//!
//! Raw sending goes through the [`MailTransport`] seam: production uses
//! [`SmtpMailer`] (lettre over STARTTLS), tests use [`MemoryTransport`].
//! SMTP credentials resolve config-first, falling back to the account
//! persisted in the settings store so the back office can configure
//! mail without a redeploy.

use async_trait::async_trait;
use error_stack::{Report, ResultExt};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::config;
use crate::store::RecordStore;

pub mod templates;

#[derive(Debug, Clone)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// What the transport reported back for one accepted message.
#[derive(Debug)]
pub struct SendOutcome {
    pub response: String,
}

#[derive(Debug, Error)]
pub enum MailerError {
    /// No SMTP account in the environment and none persisted in the
    /// settings store.
    #[error("no smtp account is configured")]
    Unconfigured,
    #[error("could not build smtp transport")]
    Transport,
    #[error("invalid mail address")]
    Address,
    #[error("could not send email")]
    Send,
}

pub type MailerResult<T> = error_stack::Result<T, MailerError>;

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &Email) -> MailerResult<SendOutcome>;
}

struct SmtpParams {
    host: String,
    port: u16,
    username: String,
    password: String,
    from: String,
}

pub struct SmtpMailer {
    config: config::Smtp,
    store: Arc<dyn RecordStore>,
}

impl SmtpMailer {
    pub fn new(config: config::Smtp, store: Arc<dyn RecordStore>) -> Self {
        Self { config, store }
    }

    /// Environment/config credentials win; the persisted settings row
    /// is the fallback.
    async fn resolve(&self) -> MailerResult<SmtpParams> {
        if self.config.is_configured() {
            return Ok(SmtpParams {
                host: self.config.host.clone(),
                port: self.config.port,
                username: self.config.username.clone(),
                password: self.config.password.as_str().to_string(),
                from: self.config.from_or_username().to_string(),
            });
        }

        let settings = self
            .store
            .app_settings()
            .await
            .change_context(MailerError::Unconfigured)?
            .ok_or_else(|| Report::new(MailerError::Unconfigured))?;

        if settings.smtp_host.is_empty() {
            return Err(Report::new(MailerError::Unconfigured));
        }

        let from = if settings.smtp_from.is_empty() {
            settings.smtp_user.clone()
        } else {
            settings.smtp_from.clone()
        };

        Ok(SmtpParams {
            host: settings.smtp_host,
            port: settings.smtp_port,
            username: settings.smtp_user,
            password: settings.smtp_pass,
            from,
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    // A fresh transport per send: credentials may have been edited in
    // the back office since the previous call.
    #[tracing::instrument(skip_all, fields(to = %email.to), name = "mailer.send")]
    async fn send(&self, email: &Email) -> MailerResult<SendOutcome> {
        let params = self.resolve().await?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&params.host)
            .change_context(MailerError::Transport)?
            .port(params.port)
            .credentials(Credentials::new(params.username, params.password))
            .build();

        let message = Message::builder()
            .from(params.from.parse().change_context(MailerError::Address)?)
            .to(email.to.parse().change_context(MailerError::Address)?)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(email.html.clone())
            .change_context(MailerError::Send)?;

        let response = transport
            .send(message)
            .await
            .change_context(MailerError::Send)?;

        Ok(SendOutcome {
            response: response.code().to_string(),
        })
    }
}

/// Records every send instead of talking to a provider. Addresses
/// registered through [`MemoryTransport::fail_for`] are rejected, which
/// is how tests exercise partial-failure paths.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    sent: Mutex<Vec<Email>>,
    failing: Mutex<HashSet<String>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, to: &str) {
        self.failing
            .lock()
            .expect("memory transport lock poisoned")
            .insert(to.to_string());
    }

    pub fn sent(&self) -> Vec<Email> {
        self.sent
            .lock()
            .expect("memory transport lock poisoned")
            .clone()
    }
}

#[async_trait]
impl MailTransport for MemoryTransport {
    async fn send(&self, email: &Email) -> MailerResult<SendOutcome> {
        let failing = self
            .failing
            .lock()
            .expect("memory transport lock poisoned")
            .contains(&email.to);
        if failing {
            return Err(Report::new(MailerError::Send)
                .attach_printable(format!("recipient rejected by test transport: {}", email.to)));
        }

        self.sent
            .lock()
            .expect("memory transport lock poisoned")
            .push(email.clone());

        Ok(SendOutcome {
            response: "250 Ok".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_transport_records_and_fails_on_demand() {
        let transport = MemoryTransport::new();
        transport.fail_for("blocked@example.com");

        let ok = Email {
            to: "ok@example.com".to_string(),
            subject: "hi".to_string(),
            html: "<p>hi</p>".to_string(),
        };
        transport.send(&ok).await.unwrap();

        let blocked = Email {
            to: "blocked@example.com".to_string(),
            ..ok.clone()
        };
        assert!(transport.send(&blocked).await.is_err());

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ok@example.com");
    }
}

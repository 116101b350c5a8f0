use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::ServiceError;
use crate::mailer::{templates, Email};
use crate::models::SubscriberStatus;
use crate::App;

/// One broadcast to every ACTIVE subscriber. Sends are sequential with
/// a fixed pause between them to stay under SMTP provider rate limits;
/// once started the loop runs to the end of the list. No cancellation,
/// no retry of failed recipients.
#[derive(Debug, Deserialize)]
pub struct SendNewsletter {
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterReport {
    pub sent_count: usize,
    pub total_count: usize,
    pub errors: Vec<NewsletterFailure>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterFailure {
    pub email: String,
    pub reason: String,
}

impl SendNewsletter {
    /// Partial failure is a valid terminal state: the report carries
    /// which addresses failed, and the broadcast as a whole still
    /// counts as completed.
    #[tracing::instrument(skip_all, name = "services.newsletter.send")]
    pub async fn perform(self, app: &App) -> Result<NewsletterReport, ServiceError> {
        let subscribers = app.store.list_subscribers().await.map_err(|report| {
            tracing::error!(?report, "could not load subscribers for broadcast");
            ServiceError::Failed
        })?;

        let active: Vec<_> = subscribers
            .into_iter()
            .filter(|s| s.status == SubscriberStatus::Active)
            .collect();

        let delay = Duration::from_millis(app.config.newsletter.send_delay_ms);
        let mut sent_count = 0;
        let mut errors = Vec::new();

        for (i, subscriber) in active.iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let unsubscribe = unsubscribe_url(&app.config.http.public_url, &subscriber.id);
            let email = Email {
                to: subscriber.email.clone(),
                subject: self.subject.clone(),
                html: templates::newsletter_html(&self.html, &unsubscribe),
            };

            match app.mailer.send(&email).await {
                Ok(..) => sent_count += 1,
                Err(report) => {
                    tracing::warn!(?report, to = %subscriber.email, "newsletter send failed");
                    errors.push(NewsletterFailure {
                        email: subscriber.email.clone(),
                        reason: report.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            sent = sent_count,
            total = active.len(),
            failed = errors.len(),
            "newsletter broadcast finished"
        );

        Ok(NewsletterReport {
            sent_count,
            total_count: active.len(),
            errors,
        })
    }
}

fn unsubscribe_url(public_url: &Url, subscriber_id: &str) -> String {
    format!(
        "{}/api/newsletter/unsubscribe?id={}",
        public_url.as_str().trim_end_matches('/'),
        subscriber_id
    )
}

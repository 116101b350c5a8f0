use chrono::Utc;
use serde::Deserialize;

use super::ServiceError;
use crate::models::{id, Subscriber, SubscriberPatch, SubscriberStatus};
use crate::util::validation;
use crate::App;

#[derive(Debug, Deserialize)]
pub struct Subscribe {
    pub email: String,
}

impl Subscribe {
    /// One record per email. An ACTIVE duplicate is rejected; an
    /// address that unsubscribed earlier is reactivated in place with a
    /// fresh subscription time.
    #[tracing::instrument(skip_all, name = "services.subscribers.subscribe")]
    pub async fn perform(self, app: &App) -> Result<Subscriber, ServiceError> {
        let email = self.email.trim().to_lowercase();
        if !validation::is_valid_email(&email) {
            return Err(ServiceError::InvalidEmail);
        }

        let existing = app
            .store
            .get_subscriber_by_email(&email)
            .await
            .map_err(|report| {
                tracing::error!(?report, "could not look up subscriber");
                ServiceError::Failed
            })?;

        match existing {
            Some(subscriber) if subscriber.status == SubscriberStatus::Active => {
                Err(ServiceError::AlreadySubscribed)
            }
            Some(subscriber) => {
                let patch = SubscriberPatch {
                    status: Some(SubscriberStatus::Active),
                    subscribed_at: Some(Utc::now()),
                };
                app.store
                    .update_subscriber(&subscriber.id, patch)
                    .await
                    .map_err(|report| {
                        tracing::error!(?report, "could not reactivate subscriber");
                        ServiceError::Failed
                    })?
                    .ok_or(ServiceError::Failed)
            }
            None => {
                let subscriber = Subscriber {
                    id: id::generate(),
                    email,
                    subscribed_at: Utc::now(),
                    status: SubscriberStatus::Active,
                };
                app.store
                    .insert_subscriber(subscriber)
                    .await
                    .map_err(|report| {
                        tracing::error!(?report, "could not persist subscriber");
                        ServiceError::Failed
                    })
            }
        }
    }
}

#[derive(Debug)]
pub struct Unsubscribe {
    pub id: String,
}

impl Unsubscribe {
    #[tracing::instrument(skip_all, fields(id = %self.id), name = "services.subscribers.unsubscribe")]
    pub async fn perform(self, app: &App) -> Result<Subscriber, ServiceError> {
        let patch = SubscriberPatch {
            status: Some(SubscriberStatus::Unsubscribed),
            subscribed_at: None,
        };
        let updated = app
            .store
            .update_subscriber(&self.id, patch)
            .await
            .map_err(|report| {
                tracing::error!(?report, "could not unsubscribe");
                ServiceError::Failed
            })?;
        updated.ok_or(ServiceError::NotFound)
    }
}

#[derive(Debug)]
pub struct ListSubscribers;

impl ListSubscribers {
    #[tracing::instrument(skip_all, name = "services.subscribers.list")]
    pub async fn perform(self, app: &App) -> Vec<Subscriber> {
        match app.store.list_subscribers().await {
            Ok(subscribers) => subscribers,
            Err(report) => {
                tracing::error!(?report, "could not list subscribers");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[tokio::test]
    async fn active_duplicate_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_utils::build_test_app(dir.path());

        Subscribe { email: "a@example.com".to_string() }
            .perform(&app)
            .await
            .unwrap();
        let error = Subscribe { email: "a@example.com".to_string() }
            .perform(&app)
            .await
            .unwrap_err();
        assert_eq!(error, ServiceError::AlreadySubscribed);
    }

    #[tokio::test]
    async fn unsubscribed_email_is_reactivated_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_utils::build_test_app(dir.path());

        let first = Subscribe { email: "a@example.com".to_string() }
            .perform(&app)
            .await
            .unwrap();
        Unsubscribe { id: first.id.clone() }.perform(&app).await.unwrap();

        let again = Subscribe { email: "a@example.com".to_string() }
            .perform(&app)
            .await
            .unwrap();

        assert_eq!(again.id, first.id);
        assert_eq!(again.status, SubscriberStatus::Active);
        assert!(again.subscribed_at >= first.subscribed_at);

        let all = ListSubscribers.perform(&app).await;
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn malformed_email_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_utils::build_test_app(dir.path());

        let error = Subscribe { email: "nope".to_string() }
            .perform(&app)
            .await
            .unwrap_err();
        assert_eq!(error, ServiceError::InvalidEmail);
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A newsletter recipient. One record per email address; unsubscribing
/// flips the status rather than deleting the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: String,
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
    pub status: SubscriberStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriberStatus {
    Active,
    Unsubscribed,
}

impl SubscriberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Unsubscribed => "UNSUBSCRIBED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(Self::Active),
            "UNSUBSCRIBED" => Some(Self::Unsubscribed),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubscriberPatch {
    pub status: Option<SubscriberStatus>,
    pub subscribed_at: Option<DateTime<Utc>>,
}

impl SubscriberPatch {
    pub fn apply(&self, subscriber: &mut Subscriber) {
        if let Some(status) = self.status {
            subscriber.status = status;
        }
        if let Some(subscribed_at) = self.subscribed_at {
            subscriber.subscribed_at = subscribed_at;
        }
    }
}

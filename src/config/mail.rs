use serde::Deserialize;

use crate::util::validation::DEFAULT_PHONE_PATTERN;
use crate::util::Sensitive;

/// SMTP account used for booking notifications and newsletter sends.
/// All fields default to empty: an unset section means "fall back to
/// the SMTP credentials persisted in the settings store", matching how
/// the back office lets an admin configure mail without redeploying.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Smtp {
    /// **Environment variables**: `KINESA_SMTP_HOST` or `SMTP_HOST`
    pub host: String,
    /// **Environment variables**: `KINESA_SMTP_PORT` or `SMTP_PORT`
    #[serde(default = "Smtp::default_port")]
    pub port: u16,
    /// **Environment variables**: `KINESA_SMTP_USERNAME` or `SMTP_USER`
    pub username: String,
    /// **Environment variables**: `KINESA_SMTP_PASSWORD` or `SMTP_PASS`
    pub password: Sensitive<String>,
    /// Sender address. Falls back to `username` when unset.
    ///
    /// **Environment variables**: `KINESA_SMTP_FROM` or `SMTP_FROM`
    pub from: String,
}

impl Smtp {
    const fn default_port() -> u16 {
        587
    }

    pub fn is_configured(&self) -> bool {
        !self.host.is_empty()
    }

    pub fn from_or_username(&self) -> &str {
        if self.from.is_empty() {
            &self.username
        } else {
            &self.from
        }
    }
}

impl Default for Smtp {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: Self::default_port(),
            username: String::new(),
            password: Sensitive::default(),
            from: String::new(),
        }
    }
}

/// Booking-form policy knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Booking {
    /// Regex a submitted phone number must match after whitespace is
    /// stripped. Defaults to the Vietnamese mobile shape the form has
    /// always enforced.
    ///
    /// **Environment variables**: `KINESA_BOOKING_PHONE_PATTERN`
    pub phone_pattern: String,
    /// Comma-separated list of back-office addresses notified on every
    /// new booking.
    ///
    /// **Environment variables**: `KINESA_BOOKING_ADMIN_EMAILS`
    pub admin_emails: String,
}

impl Booking {
    pub fn admin_recipients(&self) -> Vec<&str> {
        self.admin_emails
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl Default for Booking {
    fn default() -> Self {
        Self {
            phone_pattern: DEFAULT_PHONE_PATTERN.to_string(),
            admin_emails: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Newsletter {
    /// Fixed pause between two consecutive newsletter sends, keeping
    /// the broadcast under typical SMTP provider rate limits.
    ///
    /// **Environment variables**: `KINESA_NEWSLETTER_SEND_DELAY_MS`
    pub send_delay_ms: u64,
}

impl Default for Newsletter {
    fn default() -> Self {
        Self { send_delay_ms: 500 }
    }
}

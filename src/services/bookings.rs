use chrono::{Local, NaiveDate, Utc};
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use super::ServiceError;
use crate::mailer::{templates, Email};
use crate::models::{id, Booking, BookingPatch, BookingStatus};
use crate::util::validation;
use crate::App;

/// Why a booking submission was turned away. Expected user input
/// problems: reported inline with a localized message, never logged as
/// errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BookingRejection {
    #[error("Vui lòng điền đầy đủ thông tin bắt buộc")]
    MissingField(&'static str),
    #[error("Số điện thoại không hợp lệ")]
    InvalidPhone,
    #[error("Email không hợp lệ")]
    InvalidEmail,
    #[error("Ngày đặt lịch không hợp lệ")]
    PastDate,
}

/// A public booking-form submission. Every field arrives as free text;
/// nothing here is trusted until [`SubmitBooking::validate`] passes.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitBooking {
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub service: String,
    pub date: String,
    pub time: String,
    pub message: Option<String>,
}

impl SubmitBooking {
    /// Checks the submission in order, first failure wins: required
    /// fields, phone shape, email shape, then the date boundary (today
    /// is fine, yesterday is not). Pure; the reference day is passed
    /// in.
    pub fn validate(
        &self,
        phone_pattern: &Regex,
        today: NaiveDate,
    ) -> Result<NaiveDate, BookingRejection> {
        let required = [
            ("fullName", &self.full_name),
            ("phone", &self.phone),
            ("service", &self.service),
            ("date", &self.date),
            ("time", &self.time),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(BookingRejection::MissingField(field));
            }
        }

        if !validation::is_valid_phone(&self.phone, phone_pattern) {
            return Err(BookingRejection::InvalidPhone);
        }

        if let Some(email) = self.email.as_deref() {
            let email = email.trim();
            if !email.is_empty() && !validation::is_valid_email(email) {
                return Err(BookingRejection::InvalidEmail);
            }
        }

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| BookingRejection::PastDate)?;
        if date < today {
            return Err(BookingRejection::PastDate);
        }

        Ok(date)
    }

    #[tracing::instrument(skip_all, name = "services.bookings.submit")]
    pub async fn perform(self, app: &App) -> Result<Booking, ServiceError> {
        let date = self.validate(&app.booking_phone, Local::now().date_naive())?;

        let email = self
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(String::from);
        let message = self
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(String::from);

        let now = Utc::now();
        let booking = Booking {
            id: id::generate(),
            full_name: self.full_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email,
            service: self.service.trim().to_string(),
            date,
            time: self.time.trim().to_string(),
            message,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let booking = app.store.insert_booking(booking).await.map_err(|report| {
            tracing::error!(?report, "could not persist booking");
            ServiceError::Failed
        })?;

        // The submission is not answered until every notification
        // attempt has resolved; a failed send only logs and never rolls
        // the booking back.
        notify_booking(app, &booking).await;

        Ok(booking)
    }
}

async fn notify_booking(app: &App, booking: &Booking) {
    let mut mails = Vec::new();
    for admin in app.config.booking.admin_recipients() {
        mails.push(Email {
            to: admin.to_string(),
            subject: templates::booking_admin_subject(booking),
            html: templates::booking_admin_html(booking),
        });
    }
    if let Some(email) = &booking.email {
        mails.push(Email {
            to: email.clone(),
            subject: templates::booking_customer_subject(),
            html: templates::booking_customer_html(booking),
        });
    }

    let sends = mails.iter().map(|mail| app.mailer.send(mail));
    for (mail, outcome) in mails.iter().zip(futures::future::join_all(sends).await) {
        if let Err(report) = outcome {
            tracing::warn!(?report, to = %mail.to, "could not deliver booking notification");
        }
    }
}

#[derive(Debug)]
pub struct UpdateBookingStatus {
    pub id: String,
    pub status: BookingStatus,
}

impl UpdateBookingStatus {
    #[tracing::instrument(skip_all, fields(id = %self.id), name = "services.bookings.update_status")]
    pub async fn perform(self, app: &App) -> Result<Booking, ServiceError> {
        let patch = BookingPatch {
            status: Some(self.status),
        };
        let updated = app
            .store
            .update_booking(&self.id, patch)
            .await
            .map_err(|report| {
                tracing::error!(?report, "could not update booking");
                ServiceError::Failed
            })?;
        updated.ok_or(ServiceError::NotFound)
    }
}

#[derive(Debug)]
pub struct DeleteBooking {
    pub id: String,
}

impl DeleteBooking {
    #[tracing::instrument(skip_all, fields(id = %self.id), name = "services.bookings.delete")]
    pub async fn perform(self, app: &App) -> Result<(), ServiceError> {
        let deleted = app.store.delete_booking(&self.id).await.map_err(|report| {
            tracing::error!(?report, "could not delete booking");
            ServiceError::Failed
        })?;
        if deleted {
            Ok(())
        } else {
            Err(ServiceError::NotFound)
        }
    }
}

#[derive(Debug)]
pub struct ListBookings;

impl ListBookings {
    #[tracing::instrument(skip_all, name = "services.bookings.list")]
    pub async fn perform(self, app: &App) -> Vec<Booking> {
        match app.store.list_bookings().await {
            Ok(bookings) => bookings,
            Err(report) => {
                tracing::error!(?report, "could not list bookings");
                Vec::new()
            }
        }
    }
}

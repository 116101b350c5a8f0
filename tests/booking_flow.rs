//! End-to-end booking scenarios: public submission through validation,
//! persistence, and notification dispatch, then the admin-side status
//! lifecycle.

use chrono::Local;

use kinesa::models::BookingStatus;
use kinesa::services::bookings::{
    DeleteBooking, ListBookings, SubmitBooking, UpdateBookingStatus,
};
use kinesa::services::{BookingRejection, ServiceError};
use kinesa::test_utils;

fn tomorrow() -> String {
    Local::now()
        .date_naive()
        .succ_opt()
        .expect("tomorrow exists")
        .format("%Y-%m-%d")
        .to_string()
}

fn submission() -> SubmitBooking {
    SubmitBooking {
        full_name: "Nguyễn Văn A".to_string(),
        phone: "0912345678".to_string(),
        email: Some("a@example.com".to_string()),
        service: "Cơ xương khớp".to_string(),
        date: tomorrow(),
        time: "09:00".to_string(),
        message: Some("Đau lưng kéo dài".to_string()),
    }
}

#[tokio::test]
async fn valid_submission_persists_and_notifies_everyone() {
    let dir = tempfile::tempdir().unwrap();
    let (app, mailer) = test_utils::build_test_app(dir.path());

    let booking = submission().perform(&app).await.unwrap();
    assert_eq!(booking.status, BookingStatus::Pending);

    let stored = ListBookings.perform(&app).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, booking.id);
    assert_eq!(stored[0].status, BookingStatus::Pending);

    // One mail per configured admin recipient plus the customer copy.
    let sent = mailer.sent();
    let mut recipients: Vec<_> = sent.iter().map(|m| m.to.as_str()).collect();
    recipients.sort_unstable();
    assert_eq!(
        recipients,
        vec!["a@example.com", "clinic@example.com", "front-desk@example.com"]
    );

    let admin_mail = sent.iter().find(|m| m.to == "clinic@example.com").unwrap();
    assert!(admin_mail.html.contains("Nguyễn Văn A"));
    assert!(admin_mail.html.contains("0912345678"));
    assert!(admin_mail.html.contains("Đau lưng kéo dài"));
}

#[tokio::test]
async fn submission_without_email_skips_the_customer_copy() {
    let dir = tempfile::tempdir().unwrap();
    let (app, mailer) = test_utils::build_test_app(dir.path());

    let mut request = submission();
    request.email = None;
    request.perform(&app).await.unwrap();

    assert_eq!(mailer.sent().len(), 2);
}

#[tokio::test]
async fn rejected_submission_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (app, mailer) = test_utils::build_test_app(dir.path());

    let mut request = submission();
    request.phone = "+447882843513".to_string();

    let error = request.perform(&app).await.unwrap_err();
    assert_eq!(
        error,
        ServiceError::InvalidBooking(BookingRejection::InvalidPhone)
    );

    assert!(ListBookings.perform(&app).await.is_empty());
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn failed_notification_does_not_roll_the_booking_back() {
    let dir = tempfile::tempdir().unwrap();
    let (app, mailer) = test_utils::build_test_app(dir.path());
    mailer.fail_for("clinic@example.com");

    submission().perform(&app).await.unwrap();

    assert_eq!(ListBookings.perform(&app).await.len(), 1);
    let delivered: Vec<_> = mailer.sent().iter().map(|m| m.to.clone()).collect();
    assert!(delivered.contains(&"front-desk@example.com".to_string()));
    assert!(delivered.contains(&"a@example.com".to_string()));
    assert!(!delivered.contains(&"clinic@example.com".to_string()));
}

#[tokio::test]
async fn admin_walks_the_status_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_utils::build_test_app(dir.path());

    let booking = submission().perform(&app).await.unwrap();

    let confirmed = UpdateBookingStatus {
        id: booking.id.clone(),
        status: BookingStatus::Confirmed,
    }
    .perform(&app)
    .await
    .unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);
    assert!(confirmed.updated_at >= booking.updated_at);

    let completed = UpdateBookingStatus {
        id: booking.id.clone(),
        status: BookingStatus::Completed,
    }
    .perform(&app)
    .await
    .unwrap();
    assert_eq!(completed.status, BookingStatus::Completed);

    DeleteBooking {
        id: booking.id.clone(),
    }
    .perform(&app)
    .await
    .unwrap();
    assert!(ListBookings.perform(&app).await.is_empty());

    let error = UpdateBookingStatus {
        id: booking.id,
        status: BookingStatus::Cancelled,
    }
    .perform(&app)
    .await
    .unwrap_err();
    assert_eq!(error, ServiceError::NotFound);
}

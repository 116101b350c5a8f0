//! HTML bodies for the three outgoing mail kinds: back-office booking
//! alert, customer booking confirmation, and the newsletter wrapper.

use crate::models::Booking;

pub fn booking_admin_subject(booking: &Booking) -> String {
    format!("Lịch hẹn mới: {} - {}", booking.full_name, booking.date)
}

pub fn booking_admin_html(booking: &Booking) -> String {
    let email = booking.email.as_deref().unwrap_or("(không có)");
    let message = booking.message.as_deref().unwrap_or("(không có)");
    format!(
        r#"<html>
  <body style="font-family: Arial, sans-serif; color: #1f2937;">
    <h2 style="color: #0e7490;">Lịch hẹn mới từ website</h2>
    <table cellpadding="6" style="border-collapse: collapse;">
      <tr><td><strong>Họ và tên</strong></td><td>{full_name}</td></tr>
      <tr><td><strong>Số điện thoại</strong></td><td>{phone}</td></tr>
      <tr><td><strong>Email</strong></td><td>{email}</td></tr>
      <tr><td><strong>Dịch vụ</strong></td><td>{service}</td></tr>
      <tr><td><strong>Ngày hẹn</strong></td><td>{date}</td></tr>
      <tr><td><strong>Giờ hẹn</strong></td><td>{time}</td></tr>
      <tr><td><strong>Lời nhắn</strong></td><td>{message}</td></tr>
    </table>
    <p>Vui lòng liên hệ lại với khách hàng để xác nhận lịch hẹn.</p>
  </body>
</html>"#,
        full_name = booking.full_name,
        phone = booking.phone,
        email = email,
        service = booking.service,
        date = booking.date,
        time = booking.time,
        message = message,
    )
}

pub fn booking_customer_subject() -> String {
    "Xác nhận yêu cầu đặt lịch hẹn".to_string()
}

pub fn booking_customer_html(booking: &Booking) -> String {
    format!(
        r#"<html>
  <body style="font-family: Arial, sans-serif; color: #1f2937;">
    <h2 style="color: #0e7490;">Cảm ơn bạn đã đặt lịch hẹn</h2>
    <p>Chào {full_name},</p>
    <p>Chúng tôi đã nhận được yêu cầu đặt lịch của bạn:</p>
    <table cellpadding="6" style="border-collapse: collapse;">
      <tr><td><strong>Dịch vụ</strong></td><td>{service}</td></tr>
      <tr><td><strong>Ngày hẹn</strong></td><td>{date}</td></tr>
      <tr><td><strong>Giờ hẹn</strong></td><td>{time}</td></tr>
    </table>
    <p>Phòng khám sẽ gọi lại số <strong>{phone}</strong> để xác nhận
    trong thời gian sớm nhất.</p>
  </body>
</html>"#,
        full_name = booking.full_name,
        service = booking.service,
        date = booking.date,
        time = booking.time,
        phone = booking.phone,
    )
}

/// Wraps a composed newsletter body with the clinic frame and the
/// per-recipient unsubscribe link.
pub fn newsletter_html(body: &str, unsubscribe_url: &str) -> String {
    format!(
        r#"<html>
  <body style="font-family: Arial, sans-serif; color: #1f2937;">
    {body}
    <hr style="margin-top: 32px; border: none; border-top: 1px solid #e5e7eb;" />
    <p style="font-size: 12px; color: #6b7280;">
      Bạn nhận được email này vì đã đăng ký nhận tin từ phòng khám.
      <a href="{unsubscribe_url}">Hủy đăng ký</a>
    </p>
  </body>
</html>"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingStatus;
    use chrono::{NaiveDate, Utc};

    fn booking() -> Booking {
        let now = Utc::now();
        Booking {
            id: "1700000000000-abcd1234".into(),
            full_name: "Nguyễn Văn A".into(),
            phone: "0912345678".into(),
            email: Some("a@example.com".into()),
            service: "Cơ xương khớp".into(),
            date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            time: "09:00".into(),
            message: None,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn admin_mail_carries_every_field() {
        let booking = booking();
        let html = booking_admin_html(&booking);
        assert!(html.contains("Nguyễn Văn A"));
        assert!(html.contains("0912345678"));
        assert!(html.contains("Cơ xương khớp"));
        assert!(html.contains("2026-09-01"));
        assert!(html.contains("09:00"));
        assert!(html.contains("(không có)"));
    }

    #[test]
    fn customer_mail_addresses_the_booker() {
        let html = booking_customer_html(&booking());
        assert!(html.contains("Chào Nguyễn Văn A"));
        assert!(html.contains("0912345678"));
    }

    #[test]
    fn newsletter_appends_unsubscribe_link() {
        let html = newsletter_html(
            "<p>Tin tháng 9</p>",
            "http://localhost:3000/api/newsletter/unsubscribe?id=abc",
        );
        assert!(html.contains("<p>Tin tháng 9</p>"));
        assert!(html.contains("unsubscribe?id=abc"));
        assert!(html.contains("Hủy đăng ký"));
    }
}

//! # Message Templates
//!
//! Text of every message the booking flow sends.
//!
//! | Message            | Recipient | Built by                  |
//! |--------------------|-----------|---------------------------|
//! | Booking email      | operator  | [`operator_subject`] + [`booking_email`] |
//! | Booking email      | guest     | [`guest_subject`] + [`booking_email`]    |
//! | Booking SMS        | guest     | [`booking_sms`]           |
//! | Verification SMS   | guest     | [`otp_sms`]               |
//!
//! Guest-supplied text is HTML-escaped before it goes into the email body.

use dandeli_core::{BookingConfirmation, BookingRequest, PaymentMethod, PricingQuote};

use crate::config::ResortSettings;

/// Check-in time printed in confirmations.
pub const CHECK_IN_TIME: &str = "2:00 PM";

/// Check-out time printed in confirmations.
pub const CHECK_OUT_TIME: &str = "11:00 AM";

const DATE_FORMAT: &str = "%d %b %Y";

/// Everything a booking confirmation message mentions.
#[derive(Debug, Clone, Copy)]
pub struct BookingMessage<'a> {
    pub request: &'a BookingRequest,
    pub quote: &'a PricingQuote,
    pub confirmation: &'a BookingConfirmation,
    pub method: &'a PaymentMethod,
    pub resort: &'a ResortSettings,
}

/// Subject of the copy sent to the resort.
pub fn operator_subject(msg: &BookingMessage<'_>) -> String {
    format!(
        "New Booking: {} - {}",
        msg.request.guest_name, msg.confirmation.booking_reference
    )
}

/// Subject of the guest's confirmation.
pub fn guest_subject(resort: &ResortSettings) -> String {
    format!("Your Booking Confirmation - {}", resort.name)
}

/// HTML confirmation email, shared by the operator and guest copies.
pub fn booking_email(msg: &BookingMessage<'_>) -> String {
    let req = msg.request;
    let quote = msg.quote;
    let resort = msg.resort;

    let name = escape_html(&req.guest_name);
    let resort_name = escape_html(&resort.name);

    let discount_row = match (&quote.promo_code, quote.has_discount()) {
        (Some(code), true) => format!(
            "            <tr><td><strong>Promo Code:</strong></td><td>{} (-{})</td></tr>\n",
            escape_html(code),
            quote.discount_amount
        ),
        _ => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <style>
    body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
    .container {{ width: 100%; max-width: 600px; margin: 0 auto; }}
    .header {{ background-color: #1b5e20; color: white; padding: 20px; text-align: center; }}
    .content {{ padding: 20px; }}
    .footer {{ background-color: #f5f5f5; padding: 15px; text-align: center; font-size: 12px; }}
    .info-table {{ width: 100%; border-collapse: collapse; }}
    .info-table td {{ padding: 8px; border-bottom: 1px solid #ddd; }}
    .highlight {{ font-weight: bold; color: #1b5e20; }}
  </style>
</head>
<body>
  <div class="container">
    <div class="header">
      <h1>{resort_name} - Booking Confirmation</h1>
    </div>
    <div class="content">
      <p>Dear {name},</p>
      <p>Thank you for booking with {resort_name}. We're excited to host you!</p>

      <h3>Booking Details:</h3>
      <table class="info-table">
            <tr><td><strong>Booking Reference:</strong></td><td>{reference}</td></tr>
            <tr><td><strong>Transaction ID:</strong></td><td>{transaction}</td></tr>
            <tr><td><strong>Check-in Date:</strong></td><td>{check_in}</td></tr>
            <tr><td><strong>Check-out Date:</strong></td><td>{check_out}</td></tr>
            <tr><td><strong>Room Type:</strong></td><td>{room}</td></tr>
            <tr><td><strong>Guests:</strong></td><td>{adults} Adult(s), {children} Child(ren)</td></tr>
{discount_row}            <tr><td><strong>Amount Paid:</strong></td><td>{amount}</td></tr>
            <tr><td><strong>Payment Method:</strong></td><td>{method}</td></tr>
      </table>

      <h3>Guest Information:</h3>
      <table class="info-table">
            <tr><td><strong>Name:</strong></td><td>{name}</td></tr>
            <tr><td><strong>Email:</strong></td><td>{email}</td></tr>
            <tr><td><strong>Phone:</strong></td><td>{phone}</td></tr>
      </table>

      <p class="highlight" style="margin-top: 30px;">Important Information:</p>
      <ul>
        <li>Check-in time: {check_in_time}</li>
        <li>Check-out time: {check_out_time}</li>
        <li>Please bring a valid ID for check-in</li>
        <li>Our staff will be available 24/7 to assist you</li>
      </ul>

      <p>If you have any questions or need to modify your booking, please contact us at:</p>
      <p>{contact_phone}<br>{operator_email}</p>

      <p>Warm regards,<br>The {resort_name} Team</p>
    </div>
    <div class="footer">
      <p>{address}</p>
    </div>
  </div>
</body>
</html>
"#,
        reference = escape_html(&msg.confirmation.booking_reference),
        transaction = escape_html(&msg.confirmation.transaction_id),
        check_in = req.check_in.format(DATE_FORMAT),
        check_out = req.check_out.format(DATE_FORMAT),
        room = escape_html(req.room_display_name()),
        adults = req.adult_count,
        children = req.child_count,
        amount = quote.final_amount,
        method = msg.method.label(),
        email = escape_html(&req.email),
        phone = escape_html(&req.phone),
        check_in_time = CHECK_IN_TIME,
        check_out_time = CHECK_OUT_TIME,
        contact_phone = escape_html(&resort.contact_phone),
        operator_email = escape_html(&resort.operator_email),
        address = escape_html(&resort.address),
    )
}

/// One-line booking summary sent by text message.
pub fn booking_sms(msg: &BookingMessage<'_>) -> String {
    let req = msg.request;
    format!(
        "{}: booking {} confirmed. {}, {} guest(s), check-in {} {}, check-out {} {}. Paid {}. Queries: {}",
        msg.resort.name,
        msg.confirmation.booking_reference,
        req.room_display_name(),
        req.total_guests(),
        req.check_in.format(DATE_FORMAT),
        CHECK_IN_TIME,
        req.check_out.format(DATE_FORMAT),
        CHECK_OUT_TIME,
        msg.quote.final_amount,
        msg.resort.contact_phone,
    )
}

/// Text message carrying a verification code.
pub fn otp_sms(resort: &ResortSettings, code: &str, expiry_secs: u32) -> String {
    format!(
        "{code} is your {} verification code. It expires in {expiry_secs} seconds. Do not share it with anyone.",
        resort.name
    )
}

/// Escapes the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use dandeli_core::Money;

    fn fixtures() -> (BookingRequest, PricingQuote, BookingConfirmation, ResortSettings) {
        let request = BookingRequest {
            guest_name: "Jane <Doe>".to_string(),
            email: "jane@x.com".to_string(),
            phone: "+919876543210".to_string(),
            adult_count: 2,
            child_count: 1,
            check_in: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
            room_category: "suite".to_string(),
            promo_code: Some("SUMMER25".to_string()),
        };
        let quote = PricingQuote {
            base_amount: Money::from_rupees(300),
            discount_amount: Money::from_rupees(75),
            final_amount: Money::from_rupees(225),
            promo_code: Some("SUMMER25".to_string()),
        };
        let confirmation = BookingConfirmation {
            booking_reference: "BKMG7Q2X1C".to_string(),
            transaction_id: "TXNMG7Q2X3F".to_string(),
            confirmed_at: Utc.with_ymd_and_hms(2026, 10, 17, 9, 0, 0).unwrap(),
        };
        (request, quote, confirmation, ResortSettings::default())
    }

    #[test]
    fn test_booking_email_contents() {
        let (request, quote, confirmation, resort) = fixtures();
        let method = PaymentMethod::Upi {
            vpa: "jane@okaxis".to_string(),
        };
        let msg = BookingMessage {
            request: &request,
            quote: &quote,
            confirmation: &confirmation,
            method: &method,
            resort: &resort,
        };

        let html = booking_email(&msg);
        assert!(html.contains("Dear Jane &lt;Doe&gt;,"));
        assert!(!html.contains("<Doe>"));
        assert!(html.contains("BKMG7Q2X1C"));
        assert!(html.contains("TXNMG7Q2X3F"));
        assert!(html.contains("18 Oct 2026"));
        assert!(html.contains("20 Oct 2026"));
        assert!(html.contains("Luxury Suite"));
        assert!(html.contains("2 Adult(s), 1 Child(ren)"));
        assert!(html.contains("SUMMER25 (-₹75.00)"));
        assert!(html.contains("₹225.00"));
        assert!(html.contains("UPI Payment"));
        assert!(html.contains("Check-in time: 2:00 PM"));
        assert!(html.contains("bookings@dandeliadventures.com"));
        assert!(html.contains("Kali River Front"));
    }

    #[test]
    fn test_subjects() {
        let (request, quote, confirmation, resort) = fixtures();
        let msg = BookingMessage {
            request: &request,
            quote: &quote,
            confirmation: &confirmation,
            method: &PaymentMethod::BankTransfer,
            resort: &resort,
        };
        assert_eq!(operator_subject(&msg), "New Booking: Jane <Doe> - BKMG7Q2X1C");
        assert_eq!(
            guest_subject(&resort),
            "Your Booking Confirmation - Dandeli Adventures"
        );
    }

    #[test]
    fn test_booking_sms() {
        let (request, quote, confirmation, resort) = fixtures();
        let msg = BookingMessage {
            request: &request,
            quote: &quote,
            confirmation: &confirmation,
            method: &PaymentMethod::BankTransfer,
            resort: &resort,
        };
        let sms = booking_sms(&msg);
        assert!(sms.starts_with("Dandeli Adventures: booking BKMG7Q2X1C confirmed."));
        assert!(sms.contains("3 guest(s)"));
        assert!(sms.contains("check-out 20 Oct 2026 11:00 AM"));
    }

    #[test]
    fn test_otp_sms() {
        let text = otp_sms(&ResortSettings::default(), "482913", 60);
        assert!(text.starts_with("482913 is your Dandeli Adventures verification code."));
        assert!(text.contains("60 seconds"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }
}

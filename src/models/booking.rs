// src/models/booking.rs
use chrono::{NaiveDate, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::error::BookingError;

/// Fixed payment method tag attached to every new booking
pub const PAYMENT_METHOD_RESERVE: &str = "reserve";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BookingStatus {
    PendingPayment,
    Confirmed,
    PaymentFailed,
    Cancelled,
    Reserved,
    Unknown(String),
}

impl BookingStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "Pending Payment" => BookingStatus::PendingPayment,
            "Confirmed" => BookingStatus::Confirmed,
            "Payment Failed" => BookingStatus::PaymentFailed,
            "Cancelled" => BookingStatus::Cancelled,
            "Reserved" => BookingStatus::Reserved,
            other => BookingStatus::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BookingStatus::PendingPayment => "Pending Payment",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::PaymentFailed => "Payment Failed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Reserved => "Reserved",
            BookingStatus::Unknown(s) => s,
        }
    }

    /// Whether the guest still owes payment for this booking
    pub fn awaits_payment(&self) -> bool {
        matches!(
            self,
            BookingStatus::PendingPayment | BookingStatus::PaymentFailed
        )
    }
}

impl From<String> for BookingStatus {
    fn from(s: String) -> Self {
        BookingStatus::parse(&s)
    }
}

impl From<BookingStatus> for String {
    fn from(status: BookingStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-shareable booking code: `BK` + 6 timestamp digits + 4 alphanumerics
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingReference(String);

impl BookingReference {
    pub fn generate() -> Self {
        let suffix = Utc::now().timestamp_millis().rem_euclid(1_000_000);
        let random: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(4)
            .map(|b| char::from(b).to_ascii_uppercase())
            .collect();

        BookingReference(format!("BK{:06}{}", suffix, random))
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let rest = s.strip_prefix("BK")?;
        if rest.len() != 10 || !rest.is_ascii() {
            return None;
        }

        let (digits, code) = rest.split_at(6);
        let digits_ok = digits.bytes().all(|b| b.is_ascii_digit());
        let code_ok = code
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase());

        (digits_ok && code_ok).then(|| BookingReference(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check-in / check-out pair; check-out is always strictly after check-in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayPeriod {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayPeriod {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, BookingError> {
        if check_out <= check_in {
            return Err(BookingError::field(
                "checkOut",
                "Check-out date must be after check-in date",
            ));
        }

        Ok(Self { check_in, check_out })
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// ceil((check_out - check_in) / 1 day), always >= 1
    pub fn nights(&self) -> u32 {
        let secs = (self.check_out - self.check_in).num_seconds();
        ((secs + 86_399) / 86_400) as u32
    }
}

fn default_adults() -> u32 {
    1
}

/// Raw booking form as typed by the guest
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookingForm {
    #[serde(default)]
    pub room_id: String,

    #[serde(default)]
    pub room_name: String,

    #[validate(length(min = 2, max = 50, message = "Name must be between 2 and 50 characters"))]
    #[serde(default)]
    pub name: String,

    #[validate(length(min = 2, max = 50, message = "Surname must be between 2 and 50 characters"))]
    #[serde(default)]
    pub surname: String,

    #[validate(email(message = "Please enter a valid email address"))]
    #[serde(default)]
    pub email: String,

    #[validate(length(min = 10, message = "Address must be at least 10 characters"))]
    #[serde(default)]
    pub address: String,

    #[validate(length(min = 7, max = 20, message = "Phone number must be between 7 and 20 characters"))]
    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub check_in: String,

    #[serde(default)]
    pub check_out: String,

    #[validate(length(max = 500, message = "Special request cannot exceed 500 characters"))]
    #[serde(default)]
    pub special_request: String,

    #[validate(range(min = 1, message = "At least one adult is required"))]
    #[serde(default = "default_adults")]
    pub adults: u32,

    #[serde(default)]
    pub children: u32,
}

/// Body of `POST /api/bookings`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBookingRequest {
    pub room_id: u32,
    pub room_name: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
    pub children: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_request: Option<String>,
    pub nights: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub payment_method: String,
}

/// `data` of a successful booking creation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBooking {
    #[serde(alias = "_id", alias = "id")]
    pub booking_id: String,
    #[serde(default, alias = "bookingReference")]
    pub reference: Option<String>,
    #[serde(default)]
    pub status: Option<BookingStatus>,
    #[serde(default)]
    pub total_amount: Option<Decimal>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Outcome of a successful submission, kept for the confirmation screen
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub booking_id: String,
    pub reference: BookingReference,
    pub room_id: u32,
    pub room_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: u32,
    pub total_amount: Decimal,
    pub status: BookingStatus,
    pub email: String,
}

/// Booking as returned by the remote API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(alias = "_id", alias = "bookingId")]
    pub id: String,
    #[serde(default, alias = "reference")]
    pub booking_reference: Option<String>,
    #[serde(default)]
    pub room_id: Option<serde_json::Value>,
    #[serde(default)]
    pub room_name: Option<String>,
    #[serde(default, alias = "guestName")]
    pub name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default, alias = "guestEmail")]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub check_in: Option<String>,
    #[serde(default)]
    pub check_out: Option<String>,
    #[serde(default)]
    pub adults: Option<u32>,
    #[serde(default)]
    pub children: Option<u32>,
    #[serde(default)]
    pub nights: Option<u32>,
    #[serde(default)]
    pub total_amount: Option<Decimal>,
    pub status: BookingStatus,
}

impl Booking {
    /// "Name Surname", or whichever part is known
    pub fn guest_name(&self) -> Option<String> {
        match (&self.name, &self.surname) {
            (Some(name), Some(surname)) => Some(format!("{} {}", name, surname)),
            (Some(name), None) => Some(name.clone()),
            (None, Some(surname)) => Some(surname.clone()),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_status_round_trip_strings() {
        assert_eq!(BookingStatus::parse("Payment Failed"), BookingStatus::PaymentFailed);
        assert_eq!(BookingStatus::PendingPayment.as_str(), "Pending Payment");
        assert_eq!(
            BookingStatus::parse("On Hold"),
            BookingStatus::Unknown("On Hold".to_string())
        );
    }

    #[test]
    fn test_status_deserialize() {
        let status: BookingStatus = serde_json::from_str("\"Confirmed\"").unwrap();
        assert_eq!(status, BookingStatus::Confirmed);
        assert_eq!(serde_json::to_string(&BookingStatus::Reserved).unwrap(), "\"Reserved\"");
    }

    #[test]
    fn test_awaits_payment() {
        assert!(BookingStatus::PendingPayment.awaits_payment());
        assert!(BookingStatus::PaymentFailed.awaits_payment());
        assert!(!BookingStatus::Confirmed.awaits_payment());
    }

    #[test]
    fn test_generated_reference_format() {
        for _ in 0..50 {
            let reference = BookingReference::generate();
            assert!(
                BookingReference::parse(reference.as_str()).is_some(),
                "bad reference {}",
                reference
            );
            assert_eq!(reference.as_str().len(), 12);
        }
    }

    #[test]
    fn test_reference_parse() {
        assert!(BookingReference::parse("BK123456ABCD").is_some());
        assert!(BookingReference::parse("BK123456abcd").is_none());
        assert!(BookingReference::parse("BK12345ABCD").is_none());
        assert!(BookingReference::parse("RM123456ABCD").is_none());
    }

    #[test]
    fn test_stay_period_nights() {
        let stay = StayPeriod::new(date("2025-09-20"), date("2025-09-22")).unwrap();
        assert_eq!(stay.nights(), 2);

        let stay = StayPeriod::new(date("2025-12-31"), date("2026-01-01")).unwrap();
        assert_eq!(stay.nights(), 1);
    }

    #[test]
    fn test_stay_period_rejects_same_day() {
        let err = StayPeriod::new(date("2025-09-20"), date("2025-09-20")).unwrap_err();
        assert!(err.fields().unwrap().contains_key("checkOut"));

        assert!(StayPeriod::new(date("2025-09-22"), date("2025-09-20")).is_err());
    }

    #[test]
    fn test_new_booking_request_serializes_amount_as_number() {
        let request = NewBookingRequest {
            room_id: 1,
            room_name: "Grace Suite".to_string(),
            name: "Jane".to_string(),
            surname: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "08012345678".to_string(),
            address: "12 Marina Road, Lagos".to_string(),
            check_in: date("2025-09-20"),
            check_out: date("2025-09-22"),
            adults: 1,
            children: 0,
            special_request: None,
            nights: 2,
            total_amount: Decimal::from(300_000),
            payment_method: PAYMENT_METHOD_RESERVE.to_string(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["totalAmount"], serde_json::json!(300000.0));
        assert_eq!(json["checkIn"], "2025-09-20");
        assert_eq!(json["paymentMethod"], "reserve");
        assert!(json.get("specialRequest").is_none());
    }

    #[test]
    fn test_booking_deserialize_mongo_shape() {
        let json = serde_json::json!({
            "_id": "66f1c2",
            "bookingReference": "BK123456ABCD",
            "name": "Jane",
            "surname": "Doe",
            "totalAmount": 300000,
            "status": "Payment Failed"
        });

        let booking: Booking = serde_json::from_value(json).unwrap();
        assert_eq!(booking.id, "66f1c2");
        assert_eq!(booking.status, BookingStatus::PaymentFailed);
        assert_eq!(booking.total_amount, Some(Decimal::from(300_000)));
        assert_eq!(booking.guest_name().as_deref(), Some("Jane Doe"));
    }
}

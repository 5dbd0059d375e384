//! Access token claims
//!
//! Booking access tokens are JWTs issued by the backend. The client reads
//! the payload only to route the guest and pre-fill display fields; it
//! never holds the signing secret, so nothing decoded here is trusted for
//! authorization. The backend re-checks the token on every protected call.

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BookingError;
use crate::models::Booking;

/// Claims carried by a booking access token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccessClaims {
    /// Booking the token grants access to
    pub booking_id: String,

    #[serde(default)]
    pub guest_name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub total_amount: Option<Decimal>,

    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: Option<i64>,

    /// Expiration time (Unix timestamp)
    #[serde(default)]
    pub exp: Option<i64>,
}

impl AccessClaims {
    /// Decode the payload without checking the signature or expiry
    ///
    /// # Errors
    ///
    /// Returns `BookingError::InvalidToken` if the token is not a
    /// three-part JWT or its payload has no `bookingId`.
    pub fn decode_unverified(token: &str) -> Result<Self, BookingError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<AccessClaims>(token.trim(), &DecodingKey::from_secret(&[]), &validation)
            .map_err(|e| {
                debug!(error = %e, "Failed to decode booking access token");
                BookingError::InvalidToken(e.to_string())
            })?;

        if data.claims.booking_id.trim().is_empty() {
            return Err(BookingError::InvalidToken(
                "token does not name a booking".to_string(),
            ));
        }

        Ok(data.claims)
    }

    /// Display hint only; the backend decides whether the token still works
    pub fn looks_expired(&self) -> bool {
        match self.exp {
            Some(exp) => exp <= Utc::now().timestamp(),
            None => false,
        }
    }

    pub fn guest(&self) -> GuestSummary {
        GuestSummary {
            name: self.guest_name.clone(),
            email: self.email.clone(),
            total_amount: self.total_amount,
        }
    }
}

/// Guest fields shown next to an accessed booking
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestSummary {
    pub name: Option<String>,
    pub email: Option<String>,
    pub total_amount: Option<Decimal>,
}

impl From<&Booking> for GuestSummary {
    fn from(booking: &Booking) -> Self {
        Self {
            name: booking.guest_name(),
            email: booking.email.clone(),
            total_amount: booking.total_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn token_for(payload: serde_json::Value) -> String {
        encode(
            &Header::default(),
            &payload,
            &EncodingKey::from_secret(b"backend-only-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_decode_without_secret() {
        let token = token_for(json!({
            "bookingId": "abc123",
            "guestName": "Jane Doe",
            "email": "jane@example.com",
            "totalAmount": 300000,
            "exp": (Utc::now() + Duration::days(7)).timestamp()
        }));

        let claims = AccessClaims::decode_unverified(&token).unwrap();
        assert_eq!(claims.booking_id, "abc123");
        assert_eq!(claims.guest_name.as_deref(), Some("Jane Doe"));
        assert_eq!(claims.total_amount, Some(Decimal::from(300_000)));
        assert!(!claims.looks_expired());
    }

    #[test]
    fn test_expired_token_still_decodes() {
        let token = token_for(json!({
            "bookingId": "abc123",
            "exp": (Utc::now() - Duration::hours(1)).timestamp()
        }));

        let claims = AccessClaims::decode_unverified(&token).unwrap();
        assert!(claims.looks_expired());
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(AccessClaims::decode_unverified("not-a-token").is_err());
        assert!(AccessClaims::decode_unverified("a.b.c").is_err());

        let no_booking = token_for(json!({ "email": "jane@example.com" }));
        assert!(matches!(
            AccessClaims::decode_unverified(&no_booking),
            Err(BookingError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_guest_summary() {
        let claims = AccessClaims {
            booking_id: "abc123".to_string(),
            guest_name: Some("Jane Doe".to_string()),
            email: Some("jane@example.com".to_string()),
            total_amount: None,
            iat: None,
            exp: None,
        };

        let guest = claims.guest();
        assert_eq!(guest.name.as_deref(), Some("Jane Doe"));
        assert!(guest.total_amount.is_none());
    }
}

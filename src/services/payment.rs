//! Card payment
//!
//! Alternative to the bank-transfer proof: the backend opens a hosted
//! checkout and the guest is redirected there.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::api::BookingApi;
use crate::auth::Session;
use crate::error::{BookingError, FieldErrors};
use crate::models::{PaymentInitiation, PaymentRedirect, PaymentVerification};

pub struct PaymentService {
    api: Arc<dyn BookingApi>,
    session: Session,
}

impl PaymentService {
    pub fn new(api: Arc<dyn BookingApi>, session: Session) -> Self {
        Self { api, session }
    }

    /// Start a card checkout and return where to send the guest
    #[instrument(skip(self))]
    pub async fn initiate(
        &self,
        booking_id: &str,
        amount: Decimal,
    ) -> Result<PaymentRedirect, BookingError> {
        let mut fields = FieldErrors::new();
        if booking_id.trim().is_empty() {
            fields.insert("bookingId".to_string(), "Booking ID is required".to_string());
        }
        if amount <= Decimal::ZERO {
            fields.insert(
                "amount".to_string(),
                "Please enter a valid payment amount".to_string(),
            );
        }
        if !fields.is_empty() {
            return Err(BookingError::LocalValidation { fields });
        }

        let token = self.session.require_token().await?;
        let initiation = PaymentInitiation {
            booking_id: booking_id.trim().to_string(),
            amount,
        };

        let redirect = self
            .session
            .guard(self.api.initiate_payment(&token, &initiation).await)
            .await?;

        info!("💳 Card checkout opened for booking {}", initiation.booking_id);

        Ok(redirect)
    }

    pub async fn verify(&self, session_id: &str) -> Result<PaymentVerification, BookingError> {
        if session_id.trim().is_empty() {
            return Err(BookingError::field("sessionId", "Session ID is required"));
        }

        let token = self.session.require_token().await?;
        self.session
            .guard(self.api.verify_payment(&token, session_id.trim()).await)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockBookingApi;
    use crate::error::ErrorKind;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_initiate_validates_locally() {
        let mut api = MockBookingApi::new();
        api.expect_initiate_payment().times(0);

        let session = Session::in_memory();
        session.store_token("tok").await.unwrap();

        let payments = PaymentService::new(Arc::new(api), session);
        let err = payments.initiate("", dec!(0)).await.unwrap_err();

        let fields = err.fields().unwrap();
        assert!(fields.contains_key("bookingId"));
        assert!(fields.contains_key("amount"));
    }

    #[tokio::test]
    async fn test_initiate_returns_redirect() {
        let mut api = MockBookingApi::new();
        api.expect_initiate_payment()
            .withf(|token, initiation| token == "tok" && initiation.amount == dec!(300000))
            .times(1)
            .returning(|_, _| {
                Ok(PaymentRedirect {
                    redirect_url: "https://checkout.example.com/s/cs_1".to_string(),
                    session_id: Some("cs_1".to_string()),
                })
            });

        let session = Session::in_memory();
        session.store_token("tok").await.unwrap();

        let payments = PaymentService::new(Arc::new(api), session);
        let redirect = payments.initiate("b-1", dec!(300000)).await.unwrap();
        assert_eq!(redirect.session_id.as_deref(), Some("cs_1"));
    }

    #[tokio::test]
    async fn test_rate_limited_initiation() {
        let mut api = MockBookingApi::new();
        api.expect_initiate_payment()
            .returning(|_, _| Err(BookingError::RateLimited("wait".to_string())));

        let session = Session::in_memory();
        session.store_token("tok").await.unwrap();

        let payments = PaymentService::new(Arc::new(api), session.clone());
        let err = payments.initiate("b-1", dec!(1)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RateLimit);
        assert!(session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_verify_requires_session_id() {
        let api = MockBookingApi::new();
        let payments = PaymentService::new(Arc::new(api), Session::in_memory());
        assert!(payments.verify(" ").await.is_err());
    }
}

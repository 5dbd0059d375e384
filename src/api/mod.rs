//! Remote booking/payment API
//!
//! [`BookingApi`] is the seam every service talks through. [`HttpBookingApi`]
//! implements it over reqwest against the hotel backend; tests swap in
//! mocks or an in-memory simulator.
//!
//! # Usage
//!
//! ```rust,ignore
//! use hotel_booking::api::HttpBookingApi;
//!
//! let api = HttpBookingApi::new("http://localhost:4001", None)?;
//! let booking = api.get_booking("66f1c2").await?;
//! ```

mod client;

pub use client::HttpBookingApi;

use async_trait::async_trait;

use crate::error::BookingError;
use crate::models::{
    AccessExchange, Booking, CreatedBooking, HealthResponse, NewBookingRequest,
    PaymentInitiation, PaymentProof, PaymentRedirect, PaymentVerification, ProofLookup,
    ProofUpload,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingApi: Send + Sync {
    /// `POST /api/bookings`
    async fn create_booking(
        &self,
        request: &NewBookingRequest,
    ) -> Result<CreatedBooking, BookingError>;

    /// `POST /api/bookings/access`
    async fn exchange_access(
        &self,
        reference: &str,
        email: &str,
    ) -> Result<AccessExchange, BookingError>;

    /// `GET /api/bookings/:id`
    async fn get_booking(&self, booking_id: &str) -> Result<Booking, BookingError>;

    /// `GET /api/payments/proof/:bookingId`; a 404 is [`ProofLookup::NoProofYet`]
    async fn get_payment_proof(
        &self,
        booking_id: &str,
        token: &str,
    ) -> Result<ProofLookup, BookingError>;

    /// `POST /api/payments/proof/:bookingId` (multipart)
    async fn upload_payment_proof(
        &self,
        booking_id: &str,
        token: &str,
        upload: &ProofUpload,
    ) -> Result<PaymentProof, BookingError>;

    /// `POST /api/payments/initiate`
    async fn initiate_payment(
        &self,
        token: &str,
        initiation: &PaymentInitiation,
    ) -> Result<PaymentRedirect, BookingError>;

    /// `GET /api/payments/verify/:sessionId`
    async fn verify_payment(
        &self,
        token: &str,
        session_id: &str,
    ) -> Result<PaymentVerification, BookingError>;

    /// `GET /health`
    async fn health(&self) -> Result<HealthResponse, BookingError>;
}

// src/models/mod.rs
pub mod booking;
pub mod envelope;
pub mod payment;
pub mod room;

pub use booking::{
    Booking, BookingForm, BookingReference, BookingStatus, CreatedBooking, NewBookingRequest,
    StayPeriod, SubmissionReceipt, PAYMENT_METHOD_RESERVE,
};
pub use envelope::{AccessExchange, ApiEnvelope, ErrorEnvelope};
pub use payment::{
    PaymentInitiation, PaymentProof, PaymentRedirect, PaymentVerification, ProofFile,
    ProofLookup, ProofSubmission, ProofUpload, VerificationStatus, ALLOWED_PROOF_TYPES,
    MAX_PROOF_SIZE,
};
pub use room::{Quote, Room, RoomCatalog};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

//! Payment proof upload
//!
//! Bank-transfer guests upload a receipt (image or PDF) for their booking.
//! Everything that can be checked locally is checked before the token is
//! even read.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::api::BookingApi;
use crate::auth::Session;
use crate::error::BookingError;
use crate::models::payment::format_file_size;
use crate::models::{
    PaymentProof, ProofLookup, ProofSubmission, ProofUpload, ALLOWED_PROOF_TYPES, MAX_PROOF_SIZE,
};

/// Fail-fast checks on a proof submission; makes no network call
pub fn validate_submission(submission: ProofSubmission) -> Result<ProofUpload, BookingError> {
    let submission = ProofSubmission {
        guest_name: submission.guest_name.trim().to_string(),
        guest_email: submission.guest_email.trim().to_string(),
        ..submission
    };
    let field_check = submission.validate();

    let ProofSubmission {
        file,
        total_amount,
        guest_name,
        guest_email,
    } = submission;

    let file = file.ok_or_else(|| {
        BookingError::field("paymentProof", "Please select a payment proof file")
    })?;

    if !ALLOWED_PROOF_TYPES.contains(&file.content_type.as_str()) {
        return Err(BookingError::field(
            "paymentProof",
            "Please upload a valid image (JPEG, PNG, GIF) or PDF file",
        ));
    }

    if file.size() > MAX_PROOF_SIZE {
        return Err(BookingError::field(
            "paymentProof",
            &format!(
                "File size must be less than {} (got {})",
                format_file_size(MAX_PROOF_SIZE),
                format_file_size(file.size())
            ),
        ));
    }

    if total_amount <= Decimal::ZERO {
        return Err(BookingError::field(
            "totalAmount",
            "Please enter a valid payment amount",
        ));
    }

    if guest_name.is_empty() {
        return Err(BookingError::field("guestName", "Guest name is required"));
    }
    if guest_email.is_empty() {
        return Err(BookingError::field("guestEmail", "Guest email is required"));
    }

    field_check?;

    Ok(ProofUpload {
        file,
        total_amount,
        guest_name,
        guest_email,
    })
}

pub struct PaymentProofUploader {
    api: Arc<dyn BookingApi>,
    session: Session,
}

impl PaymentProofUploader {
    pub fn new(api: Arc<dyn BookingApi>, session: Session) -> Self {
        Self { api, session }
    }

    /// Upload a proof for `booking_id` with the session's token
    ///
    /// A second upload is never refused here; re-uploading after a
    /// rejection is the expected way to replace a proof.
    #[instrument(skip(self, submission))]
    pub async fn upload(
        &self,
        booking_id: &str,
        submission: ProofSubmission,
    ) -> Result<PaymentProof, BookingError> {
        let upload = validate_submission(submission)?;
        let token = self.session.require_token().await?;

        info!(
            "Uploading payment proof for booking {}: {} ({})",
            booking_id,
            upload.file.file_name,
            format_file_size(upload.file.size())
        );

        let result = self
            .api
            .upload_payment_proof(booking_id, &token, &upload)
            .await;

        match self.session.guard(result).await {
            Ok(proof) => {
                info!(
                    "✅ Payment proof for booking {} received, status={}",
                    booking_id,
                    proof.verification_status.as_str()
                );
                Ok(proof)
            }
            Err(e) => {
                warn!("❌ Payment proof upload failed for booking {}: {}", booking_id, e);
                Err(e)
            }
        }
    }

    /// Current proof for the booking, if any
    pub async fn proof_status(&self, booking_id: &str) -> Result<ProofLookup, BookingError> {
        let token = self.session.require_token().await?;
        let result = self.api.get_payment_proof(booking_id, &token).await;
        self.session.guard(result).await
    }
}

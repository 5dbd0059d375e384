//! Booking status view
//!
//! Reads the booking (always) and its payment proof (only with a token),
//! then works out what the guest may do next. Nothing is pushed; callers
//! fetch again after any action that may change the status.

use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::api::BookingApi;
use crate::auth::Session;
use crate::error::BookingError;
use crate::models::{Booking, BookingStatus, ProofLookup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingAction {
    UploadProof,
    ReuploadProof,
    PayByCard,
    ViewOnly,
}

/// Actions open to the guest for a booking in `status` with `proof`
pub fn derive_actions(status: &BookingStatus, proof: &ProofLookup) -> BTreeSet<BookingAction> {
    let mut actions = BTreeSet::new();

    if *status == BookingStatus::Confirmed {
        actions.insert(BookingAction::ViewOnly);
        return actions;
    }

    match proof.proof() {
        None if status.awaits_payment() => {
            actions.insert(BookingAction::UploadProof);
            actions.insert(BookingAction::PayByCard);
        }
        Some(proof) if proof.is_rejected() || *status == BookingStatus::PaymentFailed => {
            actions.insert(BookingAction::ReuploadProof);
        }
        _ => {}
    }

    if actions.is_empty() {
        actions.insert(BookingAction::ViewOnly);
    }

    actions
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStatusView {
    pub booking: Booking,
    pub proof: ProofLookup,
    pub actions: BTreeSet<BookingAction>,
    /// The stored token was rejected and cleared; token-gated actions need
    /// the guest to access the booking again first
    pub reauthenticate: bool,
}

impl BookingStatusView {
    pub fn can(&self, action: BookingAction) -> bool {
        self.actions.contains(&action)
    }
}

pub struct BookingStatusViewer {
    api: Arc<dyn BookingApi>,
    session: Session,
}

impl BookingStatusViewer {
    pub fn new(api: Arc<dyn BookingApi>, session: Session) -> Self {
        Self { api, session }
    }

    #[instrument(skip(self))]
    pub async fn fetch_status(&self, booking_id: &str) -> Result<BookingStatusView, BookingError> {
        let booking = self.api.get_booking(booking_id).await?;

        let mut reauthenticate = false;
        let proof = match self.session.token().await? {
            Some(token) => {
                let result = self.api.get_payment_proof(booking_id, &token).await;
                match self.session.guard(result).await {
                    Ok(proof) => proof,
                    Err(e) => {
                        warn!("Proof lookup for booking {} failed: {}", booking_id, e);
                        reauthenticate = e.invalidates_session();
                        ProofLookup::NoProofYet
                    }
                }
            }
            None => {
                debug!("No access token; skipping proof lookup for {}", booking_id);
                ProofLookup::NoProofYet
            }
        };

        let actions = derive_actions(&booking.status, &proof);
        info!(
            "Booking {} is {} with actions {:?}",
            booking_id, booking.status, actions
        );

        Ok(BookingStatusView {
            booking,
            proof,
            actions,
            reauthenticate,
        })
    }
}

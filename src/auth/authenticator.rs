//! Booking access authentication
//!
//! A guest reaches a booking either through the emailed link (an access
//! token) or by typing the booking reference and email. Both paths end
//! with a token held in the [`Session`]; the token path additionally
//! checks the proof endpoint so a dead link is detected up front.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use super::claims::{AccessClaims, GuestSummary};
use super::session::Session;
use crate::api::BookingApi;
use crate::error::{BookingError, ErrorKind};
use crate::models::{Booking, ProofLookup};

const INVALID_LINK_MESSAGE: &str =
    "Invalid or expired booking link. Please use the booking reference method below.";
const ACCESS_ERROR_MESSAGE: &str = "Error accessing booking. Please try again.";
const MISSING_CREDENTIALS_MESSAGE: &str = "Please enter both booking reference and email address";
const REFERENCE_FAILED_MESSAGE: &str =
    "Unable to access booking. Please check your booking reference and email.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessCredentials {
    /// Token taken from the emailed booking link
    Token(String),
    Reference { reference: String, email: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessSource {
    EmailLink,
    Reference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticating,
    Authenticated { booking_id: String },
    AuthFailed { message: String },
}

/// Outcome of a successful access attempt
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessGrant {
    pub booking_id: String,
    pub guest: GuestSummary,
    /// Only looked up on the email-link path
    pub proof: Option<ProofLookup>,
    pub source: AccessSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<Booking>,
}

pub struct BookingAccessAuthenticator {
    api: Arc<dyn BookingApi>,
    session: Session,
    state: RwLock<AuthState>,
}

impl BookingAccessAuthenticator {
    pub fn new(api: Arc<dyn BookingApi>, session: Session) -> Self {
        Self {
            api,
            session,
            state: RwLock::new(AuthState::Unauthenticated),
        }
    }

    pub async fn state(&self) -> AuthState {
        self.state.read().await.clone()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Booking a link token points at; decode only, no network call
    pub fn route_for_token(token: &str) -> Result<String, BookingError> {
        AccessClaims::decode_unverified(token)
            .map(|claims| claims.booking_id)
            .map_err(|_| BookingError::auth_with_fallback(INVALID_LINK_MESSAGE))
    }

    pub async fn authenticate(
        &self,
        credentials: AccessCredentials,
    ) -> Result<AccessGrant, BookingError> {
        match credentials {
            AccessCredentials::Token(token) => self.authenticate_with_token(&token).await,
            AccessCredentials::Reference { reference, email } => {
                self.authenticate_with_reference(&reference, &email).await
            }
        }
    }

    #[instrument(skip(self, token))]
    pub async fn authenticate_with_token(&self, token: &str) -> Result<AccessGrant, BookingError> {
        self.set_state(AuthState::Authenticating).await;

        let claims = match AccessClaims::decode_unverified(token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!("Rejected booking link token: {}", e);
                return Err(self.fail(BookingError::auth_with_fallback(INVALID_LINK_MESSAGE)).await);
            }
        };

        if claims.looks_expired() {
            info!("Link token for booking {} looks expired; asking the server", claims.booking_id);
        }

        let token = token.trim();
        self.session.store_token(token).await?;

        let proof = match self.api.get_payment_proof(&claims.booking_id, token).await {
            Ok(proof) => proof,
            Err(e) if e.invalidates_session() => {
                warn!("Booking link token rejected for booking {}", claims.booking_id);
                if let Err(clear_err) = self.session.clear().await {
                    warn!("Failed to clear access token: {}", clear_err);
                }
                return Err(self.fail(e).await);
            }
            Err(e) => {
                warn!("Proof lookup failed for booking {}: {}", claims.booking_id, e);
                return Err(self.fail(BookingError::auth(ACCESS_ERROR_MESSAGE)).await);
            }
        };

        self.set_state(AuthState::Authenticated {
            booking_id: claims.booking_id.clone(),
        })
        .await;
        info!("✅ Booking {} accessed via email link", claims.booking_id);

        Ok(AccessGrant {
            booking_id: claims.booking_id.clone(),
            guest: claims.guest(),
            proof: Some(proof),
            source: AccessSource::EmailLink,
            booking: None,
        })
    }

    #[instrument(skip(self, email))]
    pub async fn authenticate_with_reference(
        &self,
        reference: &str,
        email: &str,
    ) -> Result<AccessGrant, BookingError> {
        self.set_state(AuthState::Authenticating).await;

        let reference = reference.trim();
        let email = email.trim();

        if reference.is_empty() || email.is_empty() {
            let mut err = BookingError::field("bookingReference", MISSING_CREDENTIALS_MESSAGE);
            if let BookingError::LocalValidation { fields } = &mut err {
                fields.insert("email".to_string(), MISSING_CREDENTIALS_MESSAGE.to_string());
            }
            self.set_state(AuthState::AuthFailed {
                message: MISSING_CREDENTIALS_MESSAGE.to_string(),
            })
            .await;
            return Err(err);
        }

        let exchange = match self.api.exchange_access(reference, email).await {
            Ok(exchange) => exchange,
            Err(e) => {
                warn!("Reference access failed for {}: {}", reference, e);
                let surfaced = match e {
                    BookingError::Server { message: None, .. } => {
                        BookingError::auth(REFERENCE_FAILED_MESSAGE)
                    }
                    e if e.kind() == ErrorKind::Internal => {
                        BookingError::auth(REFERENCE_FAILED_MESSAGE)
                    }
                    e => e,
                };
                return Err(self.fail(surfaced).await);
            }
        };

        self.session.store_token(&exchange.token).await?;

        self.set_state(AuthState::Authenticated {
            booking_id: exchange.booking_id.clone(),
        })
        .await;
        info!("✅ Booking {} accessed via reference", exchange.booking_id);

        let guest = match (&exchange.booking, AccessClaims::decode_unverified(&exchange.token)) {
            (Some(booking), _) => GuestSummary::from(booking),
            (None, Ok(claims)) => claims.guest(),
            (None, Err(_)) => GuestSummary::default(),
        };

        Ok(AccessGrant {
            booking_id: exchange.booking_id,
            guest,
            proof: None,
            source: AccessSource::Reference,
            booking: exchange.booking,
        })
    }

    pub async fn logout(&self) -> Result<(), BookingError> {
        self.session.clear().await?;
        self.set_state(AuthState::Unauthenticated).await;
        Ok(())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.is_authenticated().await
    }

    async fn set_state(&self, state: AuthState) {
        *self.state.write().await = state;
    }

    async fn fail(&self, err: BookingError) -> BookingError {
        self.set_state(AuthState::AuthFailed {
            message: err.to_string(),
        })
        .await;
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockBookingApi;
    use crate::error::AccessRoute;
    use crate::models::{AccessExchange, PaymentProof, VerificationStatus};
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn link_token(booking_id: &str) -> String {
        encode(
            &Header::default(),
            &json!({ "bookingId": booking_id, "guestName": "Jane Doe", "email": "jane@example.com" }),
            &EncodingKey::from_secret(b"server-secret"),
        )
        .unwrap()
    }

    fn pending_proof() -> PaymentProof {
        PaymentProof {
            uploaded_at: Utc::now(),
            file_type: "image/png".to_string(),
            file_size: 2048,
            verification_status: VerificationStatus::Pending,
            total_amount: None,
            guest_name: None,
            guest_email: None,
            rejection_reason: None,
        }
    }

    fn authenticator(api: MockBookingApi) -> BookingAccessAuthenticator {
        BookingAccessAuthenticator::new(Arc::new(api), Session::in_memory())
    }

    #[test]
    fn test_route_for_token_without_network() {
        let token = link_token("abc123");
        assert_eq!(
            BookingAccessAuthenticator::route_for_token(&token).unwrap(),
            "abc123"
        );
        assert!(BookingAccessAuthenticator::route_for_token("garbage").is_err());
    }

    #[tokio::test]
    async fn test_token_with_existing_proof() {
        let mut api = MockBookingApi::new();
        api.expect_get_payment_proof()
            .withf(|id, _| id == "abc123")
            .times(1)
            .returning(|_, _| Ok(ProofLookup::Found(pending_proof())));

        let auth = authenticator(api);
        let grant = auth.authenticate_with_token(&link_token("abc123")).await.unwrap();

        assert_eq!(grant.booking_id, "abc123");
        assert_eq!(grant.source, AccessSource::EmailLink);
        assert!(grant.proof.unwrap().is_found());
        assert_eq!(grant.guest.name.as_deref(), Some("Jane Doe"));
        assert!(auth.is_authenticated().await);
        assert_eq!(
            auth.state().await,
            AuthState::Authenticated {
                booking_id: "abc123".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_token_without_proof_is_still_authenticated() {
        let mut api = MockBookingApi::new();
        api.expect_get_payment_proof()
            .returning(|_, _| Ok(ProofLookup::NoProofYet));

        let auth = authenticator(api);
        let grant = auth.authenticate_with_token(&link_token("abc123")).await.unwrap();

        assert_eq!(grant.proof, Some(ProofLookup::NoProofYet));
        assert!(auth.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_rejected_token_is_cleared() {
        let mut api = MockBookingApi::new();
        api.expect_get_payment_proof()
            .times(1)
            .returning(|_, _| Err(BookingError::auth_with_fallback("expired")));

        let auth = authenticator(api);
        let err = auth
            .authenticate_with_token(&link_token("abc123"))
            .await
            .unwrap_err();

        assert_eq!(err.route(), Some(AccessRoute::ReferenceForm));
        assert!(!auth.is_authenticated().await);
        assert!(matches!(auth.state().await, AuthState::AuthFailed { .. }));
    }

    #[tokio::test]
    async fn test_undecodable_token_makes_no_call() {
        let mut api = MockBookingApi::new();
        api.expect_get_payment_proof().times(0);

        let auth = authenticator(api);
        let err = auth.authenticate_with_token("abc123").await.unwrap_err();

        assert_eq!(err.to_string(), INVALID_LINK_MESSAGE);
        assert_eq!(err.route(), Some(AccessRoute::ReferenceForm));
        assert!(!auth.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_proof_lookup_failure_keeps_generic_message() {
        let mut api = MockBookingApi::new();
        api.expect_get_payment_proof()
            .returning(|_, _| Err(BookingError::Network("offline".to_string())));

        let auth = authenticator(api);
        let err = auth
            .authenticate_with_token(&link_token("abc123"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), ACCESS_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_reference_requires_both_fields() {
        let mut api = MockBookingApi::new();
        api.expect_exchange_access().times(0);

        let auth = authenticator(api);
        let err = auth
            .authenticate_with_reference("  ", "jane@example.com")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::LocalValidation);
        assert!(!auth.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_reference_success_stores_token() {
        let mut api = MockBookingApi::new();
        api.expect_exchange_access()
            .withf(|reference, email| reference == "BK123456ABCD" && email == "jane@example.com")
            .times(1)
            .returning(|_, _| {
                Ok(AccessExchange {
                    token: link_token("b-77"),
                    booking_id: "b-77".to_string(),
                    booking: None,
                })
            });

        let auth = authenticator(api);
        let grant = auth
            .authenticate(AccessCredentials::Reference {
                reference: " BK123456ABCD ".to_string(),
                email: "jane@example.com ".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(grant.booking_id, "b-77");
        assert_eq!(grant.source, AccessSource::Reference);
        assert!(grant.proof.is_none());
        assert!(auth.is_authenticated().await);

        auth.logout().await.unwrap();
        assert!(!auth.is_authenticated().await);
        assert_eq!(auth.state().await, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_reference_failure_surfaces_remote_message() {
        let mut api = MockBookingApi::new();
        api.expect_exchange_access().returning(|_, _| {
            Err(BookingError::NotFound(
                "No booking matches that reference and email".to_string(),
            ))
        });

        let auth = authenticator(api);
        let err = auth
            .authenticate_with_reference("BK123456ABCD", "jane@example.com")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "No booking matches that reference and email");
        assert!(!auth.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_reference_unauthorized_keeps_server_message() {
        let mut api = MockBookingApi::new();
        api.expect_exchange_access().returning(|_, _| {
            Err(BookingError::auth_with_fallback(
                "Email does not match this booking",
            ))
        });

        let auth = authenticator(api);
        let err = auth
            .authenticate_with_reference("BK123456ABCD", "wrong@example.com")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Email does not match this booking");
        assert_eq!(
            auth.state().await,
            AuthState::AuthFailed {
                message: "Email does not match this booking".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_reference_server_error_keeps_server_message() {
        let mut api = MockBookingApi::new();
        api.expect_exchange_access().returning(|_, _| {
            Err(BookingError::Server {
                status: 500,
                message: Some("Booking lookup temporarily unavailable".to_string()),
            })
        });

        let auth = authenticator(api);
        let err = auth
            .authenticate_with_reference("BK123456ABCD", "jane@example.com")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Booking lookup temporarily unavailable");
    }

    #[tokio::test]
    async fn test_reference_server_error_without_message_uses_generic_text() {
        let mut api = MockBookingApi::new();
        api.expect_exchange_access().returning(|_, _| {
            Err(BookingError::Server {
                status: 500,
                message: None,
            })
        });

        let auth = authenticator(api);
        let err = auth
            .authenticate_with_reference("BK123456ABCD", "jane@example.com")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), REFERENCE_FAILED_MESSAGE);
    }
}

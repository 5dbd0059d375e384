//! HTTP client for the hotel booking backend
//!
//! Turns every response into either the endpoint's `data` payload or a
//! [`BookingError`]; raw status codes never leave this module.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, ClientBuilder, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use super::BookingApi;
use crate::config::ClientConfig;
use crate::error::BookingError;
use crate::models::{
    AccessExchange, ApiEnvelope, Booking, CreatedBooking, ErrorEnvelope, HealthResponse,
    NewBookingRequest, PaymentInitiation, PaymentProof, PaymentRedirect, PaymentVerification,
    ProofLookup, ProofUpload,
};

pub(crate) const CONNECTIVITY_MESSAGE: &str =
    "Unable to connect to the server. Please check your internet connection or try again later.";
pub(crate) const AUTH_EXPIRED_MESSAGE: &str =
    "Your booking access has expired. Please use your booking reference to access again.";
const FORBIDDEN_MESSAGE: &str =
    "Access denied. You can only manage payment for your own booking.";
const RATE_LIMIT_MESSAGE: &str =
    "Too many attempts. Please wait a few minutes before trying again.";

const PROOF_FILE_FIELD: &str = "paymentProof";

/// reqwest-backed [`BookingApi`]
pub struct HttpBookingApi {
    http_client: Client,
    base_url: String,
}

impl HttpBookingApi {
    /// Creates a client for the backend at `base_url` (without `/api`)
    ///
    /// No timeout is enforced unless one is given.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, BookingError> {
        let mut builder = ClientBuilder::new()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90));

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let http_client = builder
            .build()
            .map_err(|e| BookingError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, BookingError> {
        Self::new(
            &config.api.base_url,
            config.api.timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Sends the request and reads the whole body
    async fn send(&self, request: RequestBuilder) -> Result<(StatusCode, String), BookingError> {
        let response = request.send().await.map_err(|e| {
            error!("Booking API unreachable: {}", e);
            BookingError::Network(CONNECTIVITY_MESSAGE.to_string())
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read booking API response: {}", e);
            BookingError::Network(CONNECTIVITY_MESSAGE.to_string())
        })?;

        debug!("Booking API response: status={}, body={}", status, body);

        Ok((status, body))
    }

    async fn call<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R, BookingError> {
        let (status, body) = self.send(request).await?;

        if !status.is_success() {
            return Err(error_for_status(status, &body));
        }

        parse_data(&body)
    }
}

/// Maps a non-2xx response onto the error taxonomy
///
/// A message sent by the server wins over the fixed guest-facing text.
pub(crate) fn error_for_status(status: StatusCode, body: &str) -> BookingError {
    let remote = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.remote_message());

    match status {
        StatusCode::UNAUTHORIZED => BookingError::auth_with_fallback(
            remote.unwrap_or_else(|| AUTH_EXPIRED_MESSAGE.to_string()),
        ),
        StatusCode::FORBIDDEN => {
            BookingError::Forbidden(remote.unwrap_or_else(|| FORBIDDEN_MESSAGE.to_string()))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            BookingError::RateLimited(remote.unwrap_or_else(|| RATE_LIMIT_MESSAGE.to_string()))
        }
        StatusCode::NOT_FOUND => BookingError::NotFound(
            remote.unwrap_or_else(|| "The requested booking could not be found".to_string()),
        ),
        s if s.is_client_error() => BookingError::RemoteValidation(
            remote.unwrap_or_else(|| format!("Request failed with status {}", s.as_u16())),
        ),
        s => BookingError::Server {
            status: s.as_u16(),
            message: remote,
        },
    }
}

/// Result of `GET /payments/proof/:bookingId`; a 404 means nothing was uploaded yet
pub(crate) fn proof_lookup_from(
    status: StatusCode,
    body: &str,
) -> Result<ProofLookup, BookingError> {
    if status == StatusCode::NOT_FOUND {
        return Ok(ProofLookup::NoProofYet);
    }

    if !status.is_success() {
        return Err(error_for_status(status, body));
    }

    parse_data::<PaymentProof>(body).map(ProofLookup::Found)
}

/// Text parts sent next to the [`PROOF_FILE_FIELD`] file part
fn proof_text_fields(upload: &ProofUpload) -> [(&'static str, String); 3] {
    [
        ("totalAmount", upload.total_amount.to_string()),
        ("guestName", upload.guest_name.clone()),
        ("guestEmail", upload.guest_email.clone()),
    ]
}

/// Extracts `data` from a 2xx `{ success, data }` envelope
pub(crate) fn parse_data<R: DeserializeOwned>(body: &str) -> Result<R, BookingError> {
    let envelope: ApiEnvelope<R> = serde_json::from_str(body).map_err(|e| {
        BookingError::Serialization(format!("Failed to parse JSON: {} - Body: {}", e, body))
    })?;

    if !envelope.success {
        return Err(BookingError::RemoteValidation(
            envelope
                .remote_message()
                .unwrap_or_else(|| "The request was not successful".to_string()),
        ));
    }

    envelope
        .data
        .ok_or_else(|| BookingError::Serialization("Response is missing data".to_string()))
}

#[async_trait]
impl BookingApi for HttpBookingApi {
    #[instrument(skip(self, request), fields(room_id = request.room_id))]
    async fn create_booking(
        &self,
        request: &NewBookingRequest,
    ) -> Result<CreatedBooking, BookingError> {
        let created: CreatedBooking = self
            .call(self.http_client.post(self.api_url("/bookings")).json(request))
            .await?;

        info!("Booking created: id={}", created.booking_id);

        Ok(created)
    }

    #[instrument(skip(self, email))]
    async fn exchange_access(
        &self,
        reference: &str,
        email: &str,
    ) -> Result<AccessExchange, BookingError> {
        let body = json!({
            "bookingReference": reference,
            "email": email,
        });

        self.call(
            self.http_client
                .post(self.api_url("/bookings/access"))
                .json(&body),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn get_booking(&self, booking_id: &str) -> Result<Booking, BookingError> {
        self.call(
            self.http_client
                .get(self.api_url(&format!("/bookings/{}", booking_id))),
        )
        .await
    }

    #[instrument(skip(self, token))]
    async fn get_payment_proof(
        &self,
        booking_id: &str,
        token: &str,
    ) -> Result<ProofLookup, BookingError> {
        let request = self
            .http_client
            .get(self.api_url(&format!("/payments/proof/{}", booking_id)))
            .bearer_auth(token);

        let (status, body) = self.send(request).await?;
        let lookup = proof_lookup_from(status, &body)?;

        if !lookup.is_found() {
            debug!("No payment proof yet for booking {}", booking_id);
        }

        Ok(lookup)
    }

    #[instrument(skip(self, token, upload), fields(size = upload.file.size()))]
    async fn upload_payment_proof(
        &self,
        booking_id: &str,
        token: &str,
        upload: &ProofUpload,
    ) -> Result<PaymentProof, BookingError> {
        let part = Part::stream(upload.file.bytes.clone())
            .file_name(upload.file.file_name.clone())
            .mime_str(&upload.file.content_type)
            .map_err(|e| BookingError::Serialization(format!("Invalid file type: {}", e)))?;

        let form = proof_text_fields(upload)
            .into_iter()
            .fold(Form::new().part(PROOF_FILE_FIELD, part), |form, (name, value)| {
                form.text(name, value)
            });

        let proof: PaymentProof = self
            .call(
                self.http_client
                    .post(self.api_url(&format!("/payments/proof/{}", booking_id)))
                    .bearer_auth(token)
                    .multipart(form),
            )
            .await?;

        info!(
            "Payment proof uploaded for booking {}: status={}",
            booking_id,
            proof.verification_status.as_str()
        );

        Ok(proof)
    }

    #[instrument(skip(self, token, initiation), fields(booking_id = %initiation.booking_id))]
    async fn initiate_payment(
        &self,
        token: &str,
        initiation: &PaymentInitiation,
    ) -> Result<PaymentRedirect, BookingError> {
        self.call(
            self.http_client
                .post(self.api_url("/payments/initiate"))
                .bearer_auth(token)
                .json(initiation),
        )
        .await
    }

    #[instrument(skip(self, token))]
    async fn verify_payment(
        &self,
        token: &str,
        session_id: &str,
    ) -> Result<PaymentVerification, BookingError> {
        self.call(
            self.http_client
                .get(self.api_url(&format!("/payments/verify/{}", session_id)))
                .bearer_auth(token),
        )
        .await
    }

    async fn health(&self) -> Result<HealthResponse, BookingError> {
        let (status, body) = self
            .send(self.http_client.get(format!("{}/health", self.base_url)))
            .await?;

        if !status.is_success() {
            return Err(error_for_status(status, &body));
        }

        serde_json::from_str(&body).map_err(BookingError::from)
    }
}

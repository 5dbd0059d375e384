//! Booking submission
//!
//! Validates the guest's form against the room catalog, prices the stay
//! locally and creates the booking with a single remote call.

use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::api::BookingApi;
use crate::error::{collect_field_errors, BookingError, FieldErrors};
use crate::models::{
    BookingForm, BookingReference, BookingStatus, NewBookingRequest, RoomCatalog, StayPeriod,
    SubmissionReceipt, PAYMENT_METHOD_RESERVE,
};

const SUCCESS_MESSAGE: &str =
    "Booking submitted successfully! Please check your email for payment instructions.";

/// Checks every field and prices the stay; makes no network call
///
/// All field problems are reported together, keyed by the camelCase field
/// name the form uses. Rules apply to the trimmed values that get sent.
pub fn validate_form(
    form: &BookingForm,
    catalog: &RoomCatalog,
) -> Result<NewBookingRequest, BookingError> {
    let form = &BookingForm {
        room_id: form.room_id.trim().to_string(),
        name: form.name.trim().to_string(),
        surname: form.surname.trim().to_string(),
        email: form.email.trim().to_string(),
        address: form.address.trim().to_string(),
        phone: form.phone.trim().to_string(),
        check_in: form.check_in.trim().to_string(),
        check_out: form.check_out.trim().to_string(),
        special_request: form.special_request.trim().to_string(),
        ..form.clone()
    };

    let mut fields = match form.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => collect_field_errors(&errors),
    };

    for (field, value, message) in [
        ("name", &form.name, "Name is required"),
        ("surname", &form.surname, "Surname is required"),
        ("email", &form.email, "Email is required"),
        ("address", &form.address, "Address is required"),
        ("phone", &form.phone, "Phone number is required"),
    ] {
        if value.is_empty() {
            fields.insert(field.to_string(), message.to_string());
        }
    }

    let room = if form.room_id.is_empty() {
        fields.insert("roomId".to_string(), "Please select a room".to_string());
        None
    } else {
        let room = form
            .room_id
            .parse::<u32>()
            .ok()
            .and_then(|id| catalog.find(id));
        if room.is_none() {
            fields.insert("roomId".to_string(), "Invalid room selection".to_string());
        }
        room
    };

    let check_in = parse_date(&form.check_in, "checkIn", "Check-in date", &mut fields);
    let check_out = parse_date(&form.check_out, "checkOut", "Check-out date", &mut fields);

    let stay = match (check_in, check_out) {
        (Some(check_in), Some(check_out)) => match StayPeriod::new(check_in, check_out) {
            Ok(stay) => Some(stay),
            Err(e) => {
                if let Some(errs) = e.fields() {
                    fields.extend(errs.clone());
                }
                None
            }
        },
        _ => None,
    };

    let (room, stay) = match (room, stay) {
        (Some(room), Some(stay)) if fields.is_empty() => (room, stay),
        _ => return Err(BookingError::LocalValidation { fields }),
    };

    let quote = catalog
        .quote(room.id, &stay)
        .ok_or_else(|| BookingError::field("roomId", "Invalid room selection"))?;

    let special_request = form.special_request.as_str();

    Ok(NewBookingRequest {
        room_id: room.id,
        room_name: room.name.clone(),
        name: form.name.clone(),
        surname: form.surname.clone(),
        email: form.email.clone(),
        phone: form.phone.clone(),
        address: form.address.clone(),
        check_in: stay.check_in(),
        check_out: stay.check_out(),
        adults: form.adults,
        children: form.children,
        special_request: (!special_request.is_empty()).then(|| special_request.to_string()),
        nights: quote.nights,
        total_amount: quote.total_amount,
        payment_method: PAYMENT_METHOD_RESERVE.to_string(),
    })
}

fn parse_date(
    raw: &str,
    field: &str,
    label: &str,
    fields: &mut FieldErrors,
) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        fields.insert(field.to_string(), format!("{} is required", label));
        return None;
    }

    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            fields.insert(
                field.to_string(),
                format!("{} must be a valid date (YYYY-MM-DD)", label),
            );
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug)]
struct SubmissionState {
    status: SubmissionStatus,
    message: Option<String>,
    last_submission: Option<SubmissionReceipt>,
}

pub struct BookingSubmissionService {
    api: Arc<dyn BookingApi>,
    catalog: RoomCatalog,
    state: RwLock<SubmissionState>,
}

impl BookingSubmissionService {
    pub fn new(api: Arc<dyn BookingApi>, catalog: RoomCatalog) -> Self {
        Self {
            api,
            catalog,
            state: RwLock::new(SubmissionState {
                status: SubmissionStatus::Idle,
                message: None,
                last_submission: None,
            }),
        }
    }

    pub fn catalog(&self) -> &RoomCatalog {
        &self.catalog
    }

    /// Validate, price and create the booking
    ///
    /// A failed submission is never retried here; the guest resubmits.
    #[instrument(skip(self, form), fields(room_id = %form.room_id))]
    pub async fn submit(&self, form: &BookingForm) -> Result<SubmissionReceipt, BookingError> {
        {
            let mut state = self.state.write().await;
            state.last_submission = None;
            state.status = SubmissionStatus::Idle;
            state.message = None;
        }

        let request = validate_form(form, &self.catalog)?;

        self.set_status(SubmissionStatus::Submitting, None).await;
        info!(
            "Submitting booking: room={}, nights={}, total={}",
            request.room_name, request.nights, request.total_amount
        );

        let created = match self.api.create_booking(&request).await {
            Ok(created) => created,
            Err(e) => {
                warn!("❌ Booking submission failed: {}", e);
                self.set_status(SubmissionStatus::Failed, Some(e.to_string()))
                    .await;
                return Err(e);
            }
        };

        let reference = created
            .reference
            .as_deref()
            .and_then(BookingReference::parse)
            .unwrap_or_else(BookingReference::generate);

        if let Some(remote_total) = created.total_amount {
            if remote_total != request.total_amount {
                warn!(
                    "Server total {} differs from quoted total {} for booking {}",
                    remote_total, request.total_amount, created.booking_id
                );
            }
        }

        let receipt = SubmissionReceipt {
            booking_id: created.booking_id,
            reference,
            room_id: request.room_id,
            room_name: request.room_name,
            check_in: request.check_in,
            check_out: request.check_out,
            nights: request.nights,
            total_amount: request.total_amount,
            status: created.status.unwrap_or(BookingStatus::PendingPayment),
            email: created.email.unwrap_or(request.email),
        };

        info!(
            "✅ Booking {} created with reference {}",
            receipt.booking_id, receipt.reference
        );

        let mut state = self.state.write().await;
        state.status = SubmissionStatus::Succeeded;
        state.message = Some(SUCCESS_MESSAGE.to_string());
        state.last_submission = Some(receipt.clone());

        Ok(receipt)
    }

    pub async fn status(&self) -> SubmissionStatus {
        self.state.read().await.status
    }

    pub async fn status_message(&self) -> Option<String> {
        self.state.read().await.message.clone()
    }

    /// Receipt of the last successful submission, for the confirmation screen
    pub async fn last_submission(&self) -> Option<SubmissionReceipt> {
        self.state.read().await.last_submission.clone()
    }

    pub async fn clear_status(&self) {
        let mut state = self.state.write().await;
        state.status = SubmissionStatus::Idle;
        state.message = None;
    }

    async fn set_status(&self, status: SubmissionStatus, message: Option<String>) {
        let mut state = self.state.write().await;
        state.status = status;
        state.message = message;
    }
}

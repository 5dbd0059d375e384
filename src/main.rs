// src/main.rs
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use hotel_booking::auth::{AccessCredentials, BookingAccessAuthenticator, Session};
use hotel_booking::config::ClientConfig;
use hotel_booking::error::BookingError;
use hotel_booking::models::{BookingForm, ProofFile, ProofSubmission, RoomCatalog};
use hotel_booking::services::{
    BookingStatusViewer, BookingSubmissionService, PaymentProofUploader, PaymentService,
};
use hotel_booking::{BookingApi, HttpBookingApi};

const USAGE: &str = "Usage: hotel-booking <command> [args]

Commands:
  health
  submit <form.json>
  access <bookingReference> <email>
  token <accessToken>
  upload <bookingId> <file> <amount> <guestName> <guestEmail>
  status <bookingId>
  pay <bookingId> <amount>
  verify <sessionId>
  logout";

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the JSON result
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    let config = ClientConfig::load().context("Failed to load configuration")?;
    info!("🚀 Booking client targeting {}", config.api_root());

    let api: Arc<dyn BookingApi> = Arc::new(HttpBookingApi::from_config(&config)?);
    let session = Session::persistent(config.session.token_path.clone());

    match run(command, &args[1..], api, session).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(CliError::Usage(message)) => {
            eprintln!("{}\n\n{}", message, USAGE);
            std::process::exit(2);
        }
        Err(CliError::Booking(e)) => {
            println!("{}", serde_json::to_string_pretty(&error_output(&e))?);
            std::process::exit(1);
        }
        Err(CliError::Other(e)) => Err(e),
    }
}

enum CliError {
    Usage(String),
    Booking(BookingError),
    Other(anyhow::Error),
}

impl From<BookingError> for CliError {
    fn from(err: BookingError) -> Self {
        CliError::Booking(err)
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::Other(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Other(err.into())
    }
}

async fn run(
    command: &str,
    args: &[String],
    api: Arc<dyn BookingApi>,
    session: Session,
) -> std::result::Result<serde_json::Value, CliError> {
    match (command, args) {
        ("health", []) => success(api.health().await?),

        ("submit", [form_path]) => {
            let raw = tokio::fs::read_to_string(form_path)
                .await
                .with_context(|| format!("Failed to read {}", form_path))?;
            let form: BookingForm = serde_json::from_str(&raw)?;

            let service = BookingSubmissionService::new(api, RoomCatalog::default());
            success(service.submit(&form).await?)
        }

        ("access", [reference, email]) => {
            let auth = BookingAccessAuthenticator::new(api, session);
            success(
                auth.authenticate(AccessCredentials::Reference {
                    reference: reference.clone(),
                    email: email.clone(),
                })
                .await?,
            )
        }

        ("token", [token]) => {
            let auth = BookingAccessAuthenticator::new(api, session);
            success(
                auth.authenticate(AccessCredentials::Token(token.clone()))
                    .await?,
            )
        }

        ("upload", [booking_id, file, amount, guest_name, guest_email]) => {
            let file = ProofFile::from_path(Path::new(file))
                .await
                .with_context(|| format!("Failed to read {}", file))?;

            let submission = ProofSubmission {
                file: Some(file),
                total_amount: parse_amount(amount)?,
                guest_name: guest_name.clone(),
                guest_email: guest_email.clone(),
            };

            let uploader = PaymentProofUploader::new(api, session);
            success(uploader.upload(booking_id, submission).await?)
        }

        ("status", [booking_id]) => {
            let viewer = BookingStatusViewer::new(api, session);
            success(viewer.fetch_status(booking_id).await?)
        }

        ("pay", [booking_id, amount]) => {
            let payments = PaymentService::new(api, session);
            success(payments.initiate(booking_id, parse_amount(amount)?).await?)
        }

        ("verify", [session_id]) => {
            let payments = PaymentService::new(api, session);
            success(payments.verify(session_id).await?)
        }

        ("logout", []) => {
            let auth = BookingAccessAuthenticator::new(api, session);
            auth.logout().await?;
            Ok(json!({ "success": true }))
        }

        (other, _) => Err(CliError::Usage(format!(
            "Unknown command or wrong arguments: {}",
            other
        ))),
    }
}

fn success<T: Serialize>(data: T) -> std::result::Result<serde_json::Value, CliError> {
    Ok(json!({ "success": true, "data": data }))
}

fn parse_amount(raw: &str) -> std::result::Result<Decimal, CliError> {
    match raw.trim().parse::<Decimal>() {
        Ok(amount) => Ok(amount),
        Err(_) => Err(CliError::Other(anyhow::anyhow!("Invalid amount: {}", raw))),
    }
}

fn error_output(err: &BookingError) -> serde_json::Value {
    json!({
        "success": false,
        "error": {
            "kind": err.kind().error_code(),
            "message": err.to_string(),
            "fields": err.fields(),
            "reauthenticate": err.route().is_some(),
        }
    })
}

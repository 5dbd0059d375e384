// src/models/payment.rs
use bytes::Bytes;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// Upper bound for a payment proof file, inclusive (5 MB)
pub const MAX_PROOF_SIZE: u64 = 5 * 1024 * 1024;

pub const ALLOWED_PROOF_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "application/pdf",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Rejected => "rejected",
        }
    }
}

/// Payment proof record as reported by the remote API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProof {
    pub uploaded_at: DateTime<Utc>,
    pub file_type: String,
    pub file_size: u64,
    pub verification_status: VerificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl PaymentProof {
    pub fn is_rejected(&self) -> bool {
        self.verification_status == VerificationStatus::Rejected
    }
}

/// Result of probing the proof endpoint for a booking
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "proof", rename_all = "snake_case")]
pub enum ProofLookup {
    Found(PaymentProof),
    /// Booking exists but nothing has been uploaded yet
    NoProofYet,
}

impl ProofLookup {
    pub fn proof(&self) -> Option<&PaymentProof> {
        match self {
            ProofLookup::Found(proof) => Some(proof),
            ProofLookup::NoProofYet => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ProofLookup::Found(_))
    }
}

/// A file selected as evidence of a bank transfer
#[derive(Debug, Clone)]
pub struct ProofFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ProofFile {
    pub fn new(file_name: &str, content_type: &str, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, inferring its MIME type from the extension
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "payment-proof".to_string());

        Ok(Self::new(&file_name, mime_for_path(path), bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// Everything the guest submits alongside the proof file
#[derive(Debug, Clone, Validate)]
pub struct ProofSubmission {
    pub file: Option<ProofFile>,
    pub total_amount: Decimal,
    #[validate(length(min = 1, message = "Guest name is required"))]
    pub guest_name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub guest_email: String,
}

/// A submission that passed client-side checks and is ready to send
#[derive(Debug, Clone)]
pub struct ProofUpload {
    pub file: ProofFile,
    pub total_amount: Decimal,
    pub guest_name: String,
    pub guest_email: String,
}

/// Body of `POST /api/payments/initiate`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInitiation {
    pub booking_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Card checkout redirect returned by the payment initiation endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRedirect {
    #[serde(alias = "url", alias = "checkoutUrl")]
    pub redirect_url: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVerification {
    #[serde(default)]
    pub booking_id: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub booking_status: Option<String>,
}

/// Human-readable file size, e.g. `2 MB` or `1.5 KB`
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    let rounded = (size * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

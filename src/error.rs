//! Unified error handling for the booking lifecycle client
//!
//! Every failure the client can produce is normalised into [`BookingError`]
//! at the API boundary, so callers get a user-facing message plus a
//! machine-usable [`ErrorKind`] and never have to inspect raw HTTP responses.

use std::collections::BTreeMap;
use thiserror::Error;

/// Field name -> message, for errors caught before any network call.
pub type FieldErrors = BTreeMap<String, String>;

/// Where a rejected access attempt should send the guest next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRoute {
    /// Manual booking reference + email form
    ReferenceForm,
}

/// Main client error type
#[derive(Error, Debug)]
pub enum BookingError {
    // ==================== Local Errors ====================
    #[error("Please correct the highlighted fields")]
    LocalValidation { fields: FieldErrors },

    // ==================== Remote Errors ====================
    #[error("{0}")]
    RemoteValidation(String),

    #[error("{message}")]
    Auth {
        message: String,
        route: Option<AccessRoute>,
    },

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    RateLimited(String),

    #[error("{0}")]
    NotFound(String),

    /// `message` is `None` when the response carried no readable error text
    #[error("{}", server_message(.status, .message))]
    Server {
        status: u16,
        message: Option<String>,
    },

    #[error("{0}")]
    Network(String),

    // ==================== Client Errors ====================
    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    #[error("Token storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse classification of a [`BookingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    LocalValidation,
    RemoteValidation,
    Auth,
    Forbidden,
    RateLimit,
    NotFound,
    Server,
    Network,
    Internal,
}

impl ErrorKind {
    /// Stable code for logs and JSON output
    pub fn error_code(&self) -> &'static str {
        match self {
            ErrorKind::LocalValidation => "local_validation",
            ErrorKind::RemoteValidation => "remote_validation",
            ErrorKind::Auth => "auth",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::RateLimit => "rate_limited",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Server => "server_error",
            ErrorKind::Network => "network",
            ErrorKind::Internal => "internal_error",
        }
    }
}

impl BookingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BookingError::LocalValidation { .. } => ErrorKind::LocalValidation,
            BookingError::RemoteValidation(_) => ErrorKind::RemoteValidation,
            BookingError::Auth { .. } => ErrorKind::Auth,
            BookingError::InvalidToken(_) => ErrorKind::Auth,
            BookingError::Forbidden(_) => ErrorKind::Forbidden,
            BookingError::RateLimited(_) => ErrorKind::RateLimit,
            BookingError::NotFound(_) => ErrorKind::NotFound,
            BookingError::Server { .. } => ErrorKind::Server,
            BookingError::Network(_) => ErrorKind::Network,
            BookingError::Storage(_)
            | BookingError::Config(_)
            | BookingError::Serialization(_) => ErrorKind::Internal,
        }
    }

    /// Single-field local validation error
    pub fn field(field: &str, message: &str) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), message.to_string());
        BookingError::LocalValidation { fields }
    }

    /// Authentication failure that sends the guest back to the manual access form
    pub fn auth_with_fallback(message: impl Into<String>) -> Self {
        BookingError::Auth {
            message: message.into(),
            route: Some(AccessRoute::ReferenceForm),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        BookingError::Auth {
            message: message.into(),
            route: None,
        }
    }

    /// Field errors, when the failure was caught locally
    pub fn fields(&self) -> Option<&FieldErrors> {
        match self {
            BookingError::LocalValidation { fields } => Some(fields),
            _ => None,
        }
    }

    /// Route the caller should offer after this error, if any
    pub fn route(&self) -> Option<AccessRoute> {
        match self {
            BookingError::Auth { route, .. } => *route,
            BookingError::InvalidToken(_) => Some(AccessRoute::ReferenceForm),
            _ => None,
        }
    }

    /// Whether the stored access token must be discarded
    pub fn invalidates_session(&self) -> bool {
        matches!(self, BookingError::Auth { .. } | BookingError::InvalidToken(_))
    }

    /// Whether the user can fix this by correcting input or trying again later
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::Forbidden | ErrorKind::Internal
        )
    }
}

fn server_message(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(message) => message.clone(),
        None => format!("Request failed with status {}", status),
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for BookingError {
    fn from(err: serde_json::Error) -> Self {
        BookingError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for BookingError {
    fn from(err: std::io::Error) -> Self {
        BookingError::Storage(err.to_string())
    }
}

impl From<config::ConfigError> for BookingError {
    fn from(err: config::ConfigError) -> Self {
        BookingError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for BookingError {
    fn from(errors: validator::ValidationErrors) -> Self {
        BookingError::LocalValidation {
            fields: collect_field_errors(&errors),
        }
    }
}

/// First message per field, keyed by the camelCase wire name
pub fn collect_field_errors(errors: &validator::ValidationErrors) -> FieldErrors {
    let mut fields = FieldErrors::new();
    for (field, errs) in errors.field_errors() {
        let key = camel_case(&field.to_string());
        if let Some(first) = errs.first() {
            let message = first
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{} is invalid", key));
            fields.insert(key, message);
        }
    }
    fields
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

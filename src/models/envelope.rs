// src/models/envelope.rs
use serde::Deserialize;
use serde_json::Value;

use super::booking::Booking;

/// `{ success, message?, data?, errors? }` wrapper used by every endpoint
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Value>,
}

/// Error body of a failed call; `data` is ignored
pub type ErrorEnvelope = ApiEnvelope<Value>;

impl<T> ApiEnvelope<T> {
    /// Server-supplied error text: `errors` joined with ", " when present,
    /// otherwise `message`
    pub fn remote_message(&self) -> Option<String> {
        if let Some(errors) = &self.errors {
            let joined = join_errors(errors);
            if !joined.is_empty() {
                return Some(joined);
            }
        }

        self.message
            .as_ref()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}

fn join_errors(errors: &Value) -> String {
    match errors {
        Value::Array(items) => items
            .iter()
            .filter_map(error_text)
            .collect::<Vec<_>>()
            .join(", "),
        other => error_text(other).unwrap_or_default(),
    }
}

// Accepts plain strings and `{ msg }` / `{ message }` objects
fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("msg")
            .or_else(|| map.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// `data` of `POST /api/bookings/access`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessExchange {
    pub token: String,
    pub booking_id: String,
    #[serde(default)]
    pub booking: Option<Booking>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_errors_array_joined() {
        let envelope: ErrorEnvelope = serde_json::from_value(json!({
            "success": false,
            "message": "Validation failed",
            "errors": ["Email is invalid", "Phone is too short"]
        }))
        .unwrap();

        assert_eq!(
            envelope.remote_message().as_deref(),
            Some("Email is invalid, Phone is too short")
        );
    }

    #[test]
    fn test_errors_objects_joined() {
        let envelope: ErrorEnvelope = serde_json::from_value(json!({
            "success": false,
            "errors": [{ "msg": "Room is booked", "param": "roomId" }]
        }))
        .unwrap();

        assert_eq!(envelope.remote_message().as_deref(), Some("Room is booked"));
    }

    #[test]
    fn test_message_fallback() {
        let envelope: ErrorEnvelope = serde_json::from_value(json!({
            "success": false,
            "message": "Booking not found or email does not match"
        }))
        .unwrap();

        assert_eq!(
            envelope.remote_message().as_deref(),
            Some("Booking not found or email does not match")
        );

        let empty: ErrorEnvelope = serde_json::from_value(json!({})).unwrap();
        assert!(empty.remote_message().is_none());
    }
}

//! Validation of untyped inbound payloads.
//!
//! Both validators are total over any `serde_json::Value`: they never panic
//! and never perform I/O. Subscription requests fail fast on the first bad
//! field; availability events report every bad field at once.
//!
//! ```
//! use availability_alerts::validate::{validate_availability_event, validate_subscription_request};
//! use serde_json::json;
//!
//! let request = validate_subscription_request(&json!({
//!     "model": "MacBook Pro 14",
//!     "email": "student@test.com"
//! }))
//! .unwrap();
//! assert_eq!(request.model, "MacBook Pro 14");
//!
//! let errors = validate_availability_event(&json!({
//!     "deviceModel": "iPad",
//!     "availableCount": -1,
//!     "timestamp": "not-a-date"
//! }))
//! .unwrap_err();
//! assert_eq!(errors.len(), 2);
//! ```

mod error;
mod timestamp;

use serde_json::{Map, Value};

use crate::model::{AvailabilityEvent, SubscriptionRequest};

pub use error::{ValidationError, ValidationErrorKind};
pub use timestamp::TimestampPolicy;

/// Validate a subscription request body.
pub fn validate_subscription_request(raw: &Value) -> Result<SubscriptionRequest, ValidationError> {
    let body = raw.as_object().ok_or_else(ValidationError::malformed_body)?;

    let model = non_blank_str(body, "model")
        .ok_or_else(|| ValidationError::invalid_field("model", "model must be a non-empty string"))?;

    let email = body
        .get("email")
        .and_then(Value::as_str)
        .filter(|email| !email.is_empty())
        .ok_or_else(|| ValidationError::invalid_field("email", "email must be a non-empty string"))?;

    Ok(SubscriptionRequest {
        model: model.to_string(),
        email: email.to_string(),
    })
}

/// Validate an availability event body with the lenient timestamp rule.
pub fn validate_availability_event(raw: &Value) -> Result<AvailabilityEvent, Vec<ValidationError>> {
    validate_availability_event_with(raw, TimestampPolicy::Lenient)
}

/// Validate an availability event body under the given timestamp policy.
pub fn validate_availability_event_with(
    raw: &Value,
    policy: TimestampPolicy,
) -> Result<AvailabilityEvent, Vec<ValidationError>> {
    let body = raw
        .as_object()
        .ok_or_else(|| vec![ValidationError::malformed_body()])?;

    let mut errors = Vec::new();

    let device_model = non_blank_str(body, "deviceModel");
    if device_model.is_none() {
        errors.push(ValidationError::invalid_field(
            "deviceModel",
            "deviceModel must be a non-empty string",
        ));
    }

    let available_count = body.get("availableCount").and_then(whole_count);
    if available_count.is_none() {
        errors.push(ValidationError::invalid_field(
            "availableCount",
            "availableCount must be a non-negative integer",
        ));
    }

    let timestamp = body
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|raw| policy.parse(raw));
    if timestamp.is_none() {
        errors.push(ValidationError::invalid_field(
            "timestamp",
            policy.error_message(),
        ));
    }

    match (device_model, available_count, timestamp) {
        (Some(device_model), Some(available_count), Some(timestamp)) => {
            Ok(AvailabilityEvent {
                device_model: device_model.to_string(),
                available_count,
                timestamp,
            })
        }
        _ => Err(errors),
    }
}

/// A JSON number with no fractional part that fits a `u64`. Whole floats such
/// as `3.0`, `1e3` and `-0` count; `2.5` and negatives do not.
fn whole_count(value: &Value) -> Option<u64> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(count) = n.as_u64() {
        return Some(count);
    }
    let f = n.as_f64()?;
    // u64::MAX as f64 rounds up to 2^64, which is itself out of range.
    if f.is_finite() && f.fract() == 0.0 && f >= 0.0 && f < u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}

/// A string field that is non-empty after trimming. The value itself is not trimmed.
fn non_blank_str<'a>(body: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
}

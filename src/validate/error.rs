//! Validation error type.

use std::fmt;

/// What went wrong with an inbound payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The payload is not a JSON object.
    MalformedBody,
    /// A field is missing or has the wrong type, range, or format.
    InvalidField { field: &'static str },
}

/// A single validation failure with a caller-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub message: String,
}

impl ValidationError {
    pub(crate) fn malformed_body() -> Self {
        Self {
            kind: ValidationErrorKind::MalformedBody,
            message: "Body must be a JSON object".into(),
        }
    }

    pub(crate) fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: ValidationErrorKind::InvalidField { field },
            message: message.into(),
        }
    }

    /// The offending field, if the error is field-scoped.
    pub fn field(&self) -> Option<&'static str> {
        match self.kind {
            ValidationErrorKind::InvalidField { field } => Some(field),
            ValidationErrorKind::MalformedBody => None,
        }
    }

    pub fn is_malformed_body(&self) -> bool {
        self.kind == ValidationErrorKind::MalformedBody
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

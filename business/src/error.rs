//! The one error shape UI code branches on.
//!
//! Every transport failure is normalized here at the gateway boundary.
//! Callers get a human-readable message via `Display`, a stable machine
//! code via [`ApiError::code`], and optional structured details; they never
//! see reqwest errors or raw status codes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A single invalid form field, surfaced inline by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Gateway-level failure taxonomy.
///
/// `Unauthorized` is the only variant with a logout side effect, and the
/// gateway performs it itself; callers just see the error. A 404 on an
/// expected-empty collection endpoint never reaches callers at all (it
/// becomes an empty result).
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or rejected credentials (fail-closed rejection or HTTP 401).
    #[error("{message}")]
    Unauthorized { message: String },

    /// Authenticated but not allowed (HTTP 403). No logout.
    #[error("{message}")]
    Forbidden { message: String },

    /// HTTP 404 outside the expected-empty allow-list.
    #[error("{message}")]
    NotFound { message: String },

    /// HTTP 5xx, and any other non-success status the taxonomy does not
    /// name; `status` carries the original code.
    #[error("{message}")]
    Server {
        status: u16,
        message: String,
        details: Option<Value>,
    },

    /// No response received at all.
    #[error("network error: {message}")]
    Network { message: String },

    /// The response arrived but its payload did not parse.
    #[error("invalid response payload: {message}")]
    Decode { message: String },

    /// Client-side form validation; never sent to the network.
    #[error("validation failed")]
    Validation { fields: Vec<FieldError> },
}

impl ApiError {
    /// Stable machine code for logging and UI branching.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Server { .. } => "SERVER_ERROR",
            Self::Network { .. } => "NETWORK_ERROR",
            Self::Decode { .. } => "DECODE_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
        }
    }

    /// Structured details, when the backend supplied any.
    pub fn details(&self) -> Option<&Value> {
        match self {
            Self::Server { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    /// Per-field validation failures, for inline rendering.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation { fields } => fields,
            _ => &[],
        }
    }

    pub(crate) fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

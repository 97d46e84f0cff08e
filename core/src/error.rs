//! Error types for the vehicle client.
//!
//! # Design
//! Validation failures are raised synchronously while building a handle or a
//! request. Everything that happens after the request leaves the process is
//! either a `Transport` failure (no response was received) or an `Api`
//! failure (a response arrived with a non-2xx status). Callers can always
//! tell the two apart.

use serde::Deserialize;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VehicleError>;

/// Errors returned by `VehicleClient`, `Vehicle` and the transports.
#[derive(Debug, Error)]
pub enum VehicleError {
    /// An argument was rejected before any request was built.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The API answered with a non-2xx status.
    #[error("{}", api_error_message(.status, .code, .message, .description))]
    Api {
        status: u16,
        code: Option<String>,
        message: Option<String>,
        description: Option<String>,
        request_id: Option<String>,
    },

    /// The exchange failed before a response was received.
    #[error("transport failed: {0}")]
    Transport(String),

    /// A success body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// A request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Client configuration is unusable (bad base URL, unreadable env value).
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl VehicleError {
    /// HTTP status carried by an `Api` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            VehicleError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build an `Api` error from a status code and a raw response body.
    ///
    /// Bodies that are not JSON, or JSON without the known fields, still
    /// produce an error carrying the status.
    pub fn from_response(status: u16, body: &str) -> Self {
        let fields: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        VehicleError::Api {
            status,
            code: fields.error,
            message: fields.message,
            description: fields.description,
            request_id: fields.request_id,
        }
    }
}

impl From<reqwest::Error> for VehicleError {
    fn from(err: reqwest::Error) -> Self {
        VehicleError::Transport(err.to_string())
    }
}

impl From<url::ParseError> for VehicleError {
    fn from(err: url::ParseError) -> Self {
        VehicleError::Config(format!("invalid base url: {err}"))
    }
}

/// Error payload shape returned by the API on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
    description: Option<String>,
    request_id: Option<String>,
}

fn api_error_message(
    status: &u16,
    code: &Option<String>,
    message: &Option<String>,
    description: &Option<String>,
) -> String {
    let mut out = format!("HTTP {status}");
    if let Some(code) = code {
        out.push_str(&format!(" {code}"));
    }
    if let Some(message) = message {
        out.push_str(&format!(": {message}"));
    }
    if let Some(description) = description {
        out.push_str(&format!(" ({description})"));
    }
    out
}

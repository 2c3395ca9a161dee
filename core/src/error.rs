//! Error types for the hex-to-css-filter client.
//!
//! # Design
//! Every failure a lookup can hit maps to exactly one `ApiError` variant so
//! callers can branch on the kind: `ColorNotFound` means "no approximation
//! available", `Transport` means "try again later". Validation variants are
//! raised before any request is built, so they never cost a round-trip.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by `FilterClient` and the `build_*` / `parse_*` methods of
/// `QueryClient`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A required argument (`api_key`, `sql`, hex color) was empty.
    #[error("missing required argument: {0}")]
    InvalidArgument(&'static str),

    /// The input does not reduce to 3 or 6 hex digits. Carries the input as
    /// the caller supplied it.
    #[error("hex color is not valid: {0}")]
    InvalidHexColor(String),

    /// The dataset has no row for the color.
    #[error("color not found in database | hex: {hex} | integer: {id}")]
    ColorNotFound { hex: String, id: u32 },

    /// The remote API answered with `{"error": ...}`.
    #[error("remote query failed: {0}")]
    RemoteQuery(String),

    /// The payload was neither `null`, an error object, nor the expected
    /// row shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The transport failed or the response body was not JSON.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Failure reported by a `Transport` implementation.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        ApiError::Transport(err.message)
    }
}

//! Error types for quakeview.
//!
//! Uses `thiserror` for library-style error definitions.

use thiserror::Error;

/// Message shown to users for any failed fetch, whatever the cause.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch earthquake data. Please try again later.";

/// Errors that can occur while fetching and decoding feeds.
#[derive(Error, Debug)]
pub enum QuakeviewError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// API returned an error status
    #[error("USGS API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid response structure
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Event validation failed
    #[error("Invalid event data: {0}")]
    Validation(String),

    /// The blocking fetch task panicked or was cancelled
    #[error("Fetch task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl QuakeviewError {
    /// The text a page shows in place of its data.
    ///
    /// Every cause maps to the same text. Callers log the detailed error.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        FETCH_FAILED_MESSAGE
    }
}

//! Error types for the glasswall pipeline
//!
//! This module defines the domain-specific error enums used by the transport,
//! credential and platform layers.

use thiserror::Error;

/// Errors raised by the HTTP transport when no response status is available
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Could not connect to the remote host
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Classify a reqwest error into the matching variant
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Http(err)
        }
    }
}

/// Errors raised while obtaining session credentials
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CredentialError {
    /// No CSRF token available from the session
    #[error("CSRF token not found in session")]
    MissingCsrfToken,

    /// No bearer token configured
    #[error("Bearer token not configured")]
    MissingBearerToken,

    /// Token contains characters that cannot be sent in a header
    #[error("Invalid credential value for {0}")]
    InvalidHeaderValue(&'static str),
}

/// Errors raised by the platform API layer
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Transport failure
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Unexpected HTTP status
    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    /// Rate limited (HTTP 429)
    #[error("Rate limited")]
    RateLimited,

    /// Response body did not match the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

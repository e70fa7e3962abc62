//! Unified error handling for the glasswall crate
//!
//! This module provides a unified error type that consolidates the domain-specific
//! errors into a single `Error` enum, while keeping the domain errors available
//! to the layers that raise them.
//!
//! # Architecture
//!
//! - [`GlasswallErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use glasswall::error::{Error, GlasswallErrorTrait};
//!
//! fn handle_error(err: Error) {
//!     if err.is_recoverable() {
//!         println!("Recoverable: {err}");
//!     } else {
//!         eprintln!("Fatal error: {err}");
//!     }
//! }
//! ```

use thiserror::Error;

pub use crate::utils::error::{CredentialError, FetchError, PlatformError};

/// Common trait for all glasswall error types
pub trait GlasswallErrorTrait: std::error::Error {
    /// Check if this error is recoverable (the run can continue past it)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, rate limit)
    Network,
    /// Missing or unusable session credentials
    Auth,
    /// Parsing and data extraction errors
    Parsing,
    /// Configuration and validation errors
    Config,
    /// Run was cancelled by the caller
    Cancelled,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Auth => "auth",
            Self::Parsing => "parsing",
            Self::Config => "config",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{name}")
    }
}

impl GlasswallErrorTrait for FetchError {
    fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidUrl(_))
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidUrl(_) => ErrorCategory::Config,
            _ => ErrorCategory::Network,
        }
    }
}

impl GlasswallErrorTrait for CredentialError {
    fn is_recoverable(&self) -> bool {
        false
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Auth
    }
}

impl GlasswallErrorTrait for PlatformError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::RateLimited => true,
            Self::Status(status) => *status >= 500,
            Self::MalformedResponse(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(e) => e.category(),
            Self::MalformedResponse(_) => ErrorCategory::Parsing,
            Self::Status(401) | Self::Status(403) => ErrorCategory::Auth,
            _ => ErrorCategory::Network,
        }
    }
}

/// Unified error type for the glasswall crate
#[derive(Error, Debug)]
pub enum Error {
    /// Transport errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Credential errors, fatal before any network work
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Platform API errors
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Existing mute list could only be read partially and strict mode is on
    #[error("Existing mute list read incomplete after {handles} handles: {reason}")]
    PartialExistingList { handles: usize, reason: String },

    /// Run cancelled by the caller
    #[error("Run cancelled")]
    Cancelled,
}

impl GlasswallErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Credential(e) => e.is_recoverable(),
            Self::Platform(e) => e.is_recoverable(),
            Self::PartialExistingList { .. } => false,
            Self::Cancelled => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(e) => e.category(),
            Self::Credential(e) => e.category(),
            Self::Platform(e) => e.category(),
            Self::PartialExistingList { .. } => ErrorCategory::Network,
            Self::Cancelled => ErrorCategory::Cancelled,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

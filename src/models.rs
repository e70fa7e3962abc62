// Core data structures for the glasswall pipeline

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Platform username in canonical (lower-case) form
///
/// Handles compare case-insensitively: construction always folds to lower case,
/// so two `Handle`s are equal iff their canonical forms are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
    /// Create a handle from any raw spelling, folding it to canonical form
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(canonical(raw.as_ref()))
    }

    /// Canonical string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Handle {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for Handle {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<Handle> for String {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

impl AsRef<str> for Handle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical form of a handle: lower-cased
pub fn canonical(raw: &str) -> String {
    raw.to_lowercase()
}

/// Ordered set of canonical handles
///
/// A `BTreeSet` keeps iteration order stable, which makes a seeded shuffle of
/// the reconciled queue reproducible.
pub type HandleSet = BTreeSet<Handle>;

/// Pagination cursor for the platform's mute-list endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    /// First page (`-1` on the wire)
    Start,
    /// Opaque continuation token
    Token(String),
    /// End-of-list sentinel (`0` on the wire)
    End,
}

impl PageCursor {
    /// Interpret a cursor value returned by the platform
    ///
    /// Only an exact `"0"` is the end sentinel; every other value, including an
    /// empty string, is a continuation token.
    pub fn from_wire(value: &str) -> Self {
        if value == "0" {
            Self::End
        } else {
            Self::Token(value.to_string())
        }
    }

    /// Value sent in the `cursor` query parameter
    pub fn as_query_value(&self) -> &str {
        match self {
            Self::Start => "-1",
            Self::Token(token) => token,
            Self::End => "0",
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_query_value())
    }
}

/// Outcome of applying the mute action to a single handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionOutcome {
    /// 2xx response
    Success,
    /// Non-2xx response
    HttpFailure { status: u16 },
    /// Transport-level failure, no HTTP status
    NetworkFailure { message: String },
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Whether the platform signalled rate limiting
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::HttpFailure { status: 429 })
    }
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "ok"),
            Self::HttpFailure { status } => write!(f, "HTTP {status}"),
            Self::NetworkFailure { message } => write!(f, "network error: {message}"),
        }
    }
}

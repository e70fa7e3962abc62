//! Session credentials as an injected capability
//!
//! The pipeline never reads browser state or environment variables directly;
//! it asks a [`CredentialProvider`] for an opaque [`Credentials`] record before
//! any network work starts. A missing credential is the one fatal error of a run.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::utils::error::CredentialError;

/// Cookie carrying the platform's CSRF token
pub const CSRF_COOKIE_NAME: &str = "ct0";

/// Authentication material for platform API calls
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    bearer_token: String,
    csrf_token: String,
    cookie: Option<String>,
}

impl Credentials {
    pub fn new(bearer_token: impl Into<String>, csrf_token: impl Into<String>) -> Self {
        Self {
            bearer_token: bearer_token.into(),
            csrf_token: csrf_token.into(),
            cookie: None,
        }
    }

    /// Attach the session cookie header forwarded on every API call
    #[must_use]
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    /// Build credentials from a cookie header, taking the CSRF token from `ct0`
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::MissingCsrfToken` if the cookie has no `ct0` value.
    pub fn from_cookie(
        bearer_token: impl Into<String>,
        cookie: impl Into<String>,
    ) -> Result<Self, CredentialError> {
        let cookie = cookie.into();
        let csrf = csrf_from_cookie(&cookie).ok_or(CredentialError::MissingCsrfToken)?;
        Ok(Self::new(bearer_token, csrf).with_cookie(cookie))
    }

    pub fn bearer_token(&self) -> &str {
        &self.bearer_token
    }

    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("bearer_token", &"<redacted>")
            .field("csrf_token", &"<redacted>")
            .field("cookie", &self.cookie.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Extract the `ct0` CSRF token from a cookie header
///
/// # Examples
///
/// ```
/// use glasswall::platform::credentials::csrf_from_cookie;
///
/// assert_eq!(csrf_from_cookie("lang=en; ct0=abc123; twid=u"), Some("abc123"));
/// assert_eq!(csrf_from_cookie("lang=en"), None);
/// ```
pub fn csrf_from_cookie(cookie: &str) -> Option<&str> {
    static CT0_RE: OnceLock<Regex> = OnceLock::new();

    let re = CT0_RE
        .get_or_init(|| Regex::new(r"(?:^|;\s*)ct0=([^;]*)").expect("Invalid regex pattern"));

    re.captures(cookie)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|token| !token.is_empty())
}

/// Source of session credentials
pub trait CredentialProvider: Send + Sync {
    /// Return the current credentials
    ///
    /// # Errors
    ///
    /// Returns a `CredentialError` when the session has no usable token.
    fn credentials(&self) -> Result<Credentials, CredentialError>;
}

/// Provider returning a fixed credential record
#[derive(Debug, Clone)]
pub struct StaticCredentials(pub Credentials);

impl CredentialProvider for StaticCredentials {
    fn credentials(&self) -> Result<Credentials, CredentialError> {
        Ok(self.0.clone())
    }
}

/// Provider that never has credentials (signed-out session)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn credentials(&self) -> Result<Credentials, CredentialError> {
        Err(CredentialError::MissingCsrfToken)
    }
}

/// Provider reading `GLASSWALL_*` environment variables at call time
///
/// - `GLASSWALL_BEARER_TOKEN` (required)
/// - `GLASSWALL_COOKIE` (session cookie header; its `ct0` supplies the CSRF token)
/// - `GLASSWALL_CSRF_TOKEN` (explicit CSRF token, wins over the cookie's `ct0`)
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    pub const BEARER_VAR: &'static str = "GLASSWALL_BEARER_TOKEN";
    pub const COOKIE_VAR: &'static str = "GLASSWALL_COOKIE";
    pub const CSRF_VAR: &'static str = "GLASSWALL_CSRF_TOKEN";
}

impl CredentialProvider for EnvCredentialProvider {
    fn credentials(&self) -> Result<Credentials, CredentialError> {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        let bearer = non_empty(Self::BEARER_VAR).ok_or(CredentialError::MissingBearerToken)?;
        let cookie = non_empty(Self::COOKIE_VAR);

        let csrf = non_empty(Self::CSRF_VAR)
            .or_else(|| cookie.as_deref().and_then(csrf_from_cookie).map(str::to_string))
            .ok_or(CredentialError::MissingCsrfToken)?;

        let mut credentials = Credentials::new(bearer, csrf);
        if let Some(cookie) = cookie {
            credentials = credentials.with_cookie(cookie);
        }
        Ok(credentials)
    }
}

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE,
    COOKIE,
};

use crate::platform::credentials::Credentials;
use crate::utils::error::CredentialError;

/// Build browser-like headers for anonymous directory page fetches
///
/// # Examples
///
/// ```
/// use glasswall::crawler::headers::build_directory_headers;
///
/// let headers = build_directory_headers();
/// assert!(headers.contains_key("accept"));
/// ```
pub fn build_directory_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();

    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("upgrade-insecure-requests"),
        HeaderValue::from_static("1"),
    );

    headers
}

/// Build authenticated headers for platform API calls
///
/// Sets the bearer authorization, the session CSRF token and, when present,
/// the session cookie header.
///
/// # Errors
///
/// Returns `CredentialError::InvalidHeaderValue` if a credential contains
/// characters that are not allowed in an HTTP header.
pub fn build_platform_headers(credentials: &Credentials) -> Result<HeaderMap, CredentialError> {
    let mut headers = HeaderMap::new();

    let bearer = format!("Bearer {}", credentials.bearer_token());
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&bearer)
            .map_err(|_| CredentialError::InvalidHeaderValue("authorization"))?,
    );
    headers.insert(
        HeaderName::from_static("x-csrf-token"),
        HeaderValue::from_str(credentials.csrf_token())
            .map_err(|_| CredentialError::InvalidHeaderValue("x-csrf-token"))?,
    );
    if let Some(cookie) = credentials.cookie() {
        headers.insert(
            COOKIE,
            HeaderValue::from_str(cookie)
                .map_err(|_| CredentialError::InvalidHeaderValue("cookie"))?,
        );
    }
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
    );
    headers.insert(
        HeaderName::from_static("x-twitter-active-user"),
        HeaderValue::from_static("yes"),
    );

    Ok(headers)
}

/// Headers for the url-encoded mute mutation
pub fn build_form_headers(credentials: &Credentials) -> Result<HeaderMap, CredentialError> {
    let mut headers = build_platform_headers(credentials)?;
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );
    Ok(headers)
}

//! Authenticated client for the platform's mute endpoints
//!
//! Two calls are exposed:
//! - `GET {api}/mutes/users/list.json` - one page of the existing mute list
//! - `POST {api}/mutes/users/create.json` - mute a single handle

use reqwest::header::HeaderMap;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::PlatformConfig;
use crate::crawler::fetcher::{HttpRequest, HttpResponse, HttpTransport};
use crate::crawler::headers::{build_form_headers, build_platform_headers};
use crate::models::{Handle, PageCursor};
use crate::platform::credentials::Credentials;
use crate::utils::error::{CredentialError, FetchError, PlatformError};
use crate::utils::truncate_text;

/// Path of the mute-list endpoint relative to the API base
pub const MUTE_LIST_PATH: &str = "/mutes/users/list.json";

/// Path of the mute-create endpoint relative to the API base
pub const MUTE_CREATE_PATH: &str = "/mutes/users/create.json";

/// One user record in a mute-list page
#[derive(Debug, Clone, Deserialize)]
pub struct MutedUser {
    pub screen_name: String,
}

/// Decoded mute-list page
#[derive(Debug, Clone, Deserialize)]
pub struct MutePage {
    #[serde(default)]
    pub users: Vec<MutedUser>,

    #[serde(default)]
    pub next_cursor_str: Option<String>,

    #[serde(default)]
    pub next_cursor: Option<serde_json::Value>,
}

impl MutePage {
    /// Parse a mute-list response body
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::MalformedResponse` if the body is not the expected JSON shape.
    pub fn parse(body: &str) -> Result<Self, PlatformError> {
        serde_json::from_str(body)
            .map_err(|e| PlatformError::MalformedResponse(truncate_text(&e.to_string(), 200)))
    }

    /// Cursor for the next request, preferring the string form
    ///
    /// Returns `None` when the page carries no cursor at all.
    pub fn next_cursor(&self) -> Option<PageCursor> {
        if let Some(cursor) = &self.next_cursor_str {
            return Some(PageCursor::from_wire(cursor));
        }

        match &self.next_cursor {
            Some(serde_json::Value::Number(n)) => Some(PageCursor::from_wire(&n.to_string())),
            Some(serde_json::Value::String(s)) => Some(PageCursor::from_wire(s)),
            _ => None,
        }
    }

    /// Canonical handles on this page
    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.users.iter().map(|u| Handle::new(&u.screen_name))
    }
}

/// Client for the platform's mute API
pub struct PlatformClient {
    transport: Arc<dyn HttpTransport>,
    api_base_url: String,
    timeout: Duration,
    json_headers: HeaderMap,
    form_headers: HeaderMap,
}

impl PlatformClient {
    /// Create a client bound to one set of credentials
    ///
    /// # Errors
    ///
    /// Returns `CredentialError` if the credentials cannot be sent as headers.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        config: &PlatformConfig,
        credentials: &Credentials,
    ) -> Result<Self, CredentialError> {
        Ok(Self {
            transport,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(config.request_timeout_ms),
            json_headers: build_platform_headers(credentials)?,
            form_headers: build_form_headers(credentials)?,
        })
    }

    /// URL of one mute-list page
    pub fn mute_list_url(&self, cursor: &PageCursor) -> String {
        format!(
            "{}{MUTE_LIST_PATH}?include_entities=false&skip_status=true&cursor={}",
            self.api_base_url,
            cursor.as_query_value()
        )
    }

    /// Fetch one page of the mute list
    ///
    /// Any HTTP status is returned as a response; only transport failures are errors.
    pub async fn fetch_mute_page(&self, cursor: &PageCursor) -> Result<HttpResponse, FetchError> {
        let request = HttpRequest::get(self.mute_list_url(cursor))
            .with_headers(self.json_headers.clone())
            .with_timeout(self.timeout);

        self.transport.send(request).await
    }

    /// Mute a single handle
    ///
    /// # Errors
    ///
    /// - `PlatformError::RateLimited` on HTTP 429
    /// - `PlatformError::Status` on any other non-2xx status
    /// - `PlatformError::Fetch` when no status was received
    pub async fn mute(&self, handle: &Handle) -> Result<(), PlatformError> {
        let url = format!("{}{MUTE_CREATE_PATH}", self.api_base_url);
        let form = vec![("screen_name".to_string(), handle.as_str().to_string())];
        let request = HttpRequest::post_form(url, form)
            .with_headers(self.form_headers.clone())
            .with_timeout(self.timeout);

        let response = self.transport.send(request).await?;
        match response.status {
            200..=299 => Ok(()),
            429 => Err(PlatformError::RateLimited),
            status => Err(PlatformError::Status(status)),
        }
    }
}

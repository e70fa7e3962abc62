//! HTTP transport adapter
//!
//! This module wraps the two kinds of requests the pipeline issues:
//! - Authenticated JSON API calls to the platform
//! - Anonymous HTML page fetches from the external directory
//!
//! Both go through [`HttpTransport`], which reports any HTTP status as a
//! successful [`HttpResponse`] and reserves `Err` for transport-level failures
//! (timeouts, refused connections, undecodable bodies). Callers decide what a
//! non-2xx status means for them.

use crate::utils::error::FetchError;
use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use reqwest::{header::HeaderMap, Client, Response};
use std::time::Duration;

/// HTTP method subset used by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A single outgoing request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderMap,
    /// URL-encoded form fields for POST bodies
    pub form: Vec<(String, String)>,
    /// Per-request timeout overriding the client default
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// GET request with no extra headers
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: HeaderMap::new(),
            form: Vec::new(),
            timeout: None,
        }
    }

    /// POST request carrying a url-encoded form body
    pub fn post_form(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: HeaderMap::new(),
            form,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Status and decoded body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

/// Opaque "issue HTTP request, get status+body or failure" capability
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and return its status and body
    ///
    /// # Errors
    ///
    /// Returns a `FetchError` only when no HTTP status could be obtained.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError>;
}

/// `HttpTransport` backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    /// HTTP client with configured timeout and compression
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with the given user agent and default timeout
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .build()?;

        Ok(Self { client })
    }

    /// Decode the response body using the charset from its Content-Type
    async fn decode_response(response: Response) -> Result<HttpResponse, FetchError> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let bytes = response.bytes().await.map_err(FetchError::from_reqwest)?;
        let body = decode_bytes(&bytes, &content_type);

        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {e}", request.url)))?;

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url).form(&request.form),
        };
        builder = builder.headers(request.headers);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        tracing::trace!(url = %request.url, method = ?request.method, "Sending request");

        let response = builder.send().await.map_err(FetchError::from_reqwest)?;
        Self::decode_response(response).await
    }
}

/// Decode bytes to a string using the Content-Type charset, falling back to UTF-8
///
/// Unknown or missing charsets decode as UTF-8. Malformed sequences become
/// replacement characters so the response status always reaches the caller.
pub fn decode_bytes(bytes: &[u8], content_type: &str) -> String {
    let encoding = charset_from_content_type(content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);

    let (cow, _encoding, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!(encoding = encoding.name(), "Body contained malformed sequences");
    }

    cow.into_owned()
}

fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(str::trim)
        .find_map(|part| {
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim().trim_matches('"').to_string())
        })
}

//! Handle extraction from directory pages
//!
//! A directory page links to platform profiles. This module turns a page body
//! into the set of canonical handles it links to, skipping navigation routes,
//! post permalinks and hashtag links. It is pure and never fails: malformed or
//! error pages simply yield an empty set.

use regex::Regex;
use scraper::Html;
use std::sync::OnceLock;
use url::Url;

use crate::config::Config;
use crate::models::{Handle, HandleSet};
use crate::parser::selectors::{
    ERROR_TITLE_MARKERS, HASHTAG_MARKERS, LINK, RESERVED_PATHS, STATUS_MARKERS, TITLE,
};

/// Extraction options
#[derive(Debug, Clone)]
pub struct ExtractorOptions {
    /// Hosts whose single-segment paths are profiles (lower-case)
    pub profile_hosts: Vec<String>,

    /// Only accept links whose visible text starts with `@`
    pub require_at_label: bool,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            profile_hosts: vec![
                "x.com".to_string(),
                "twitter.com".to_string(),
                "mobile.twitter.com".to_string(),
                "www.x.com".to_string(),
                "www.twitter.com".to_string(),
            ],
            require_at_label: false,
        }
    }
}

impl From<&Config> for ExtractorOptions {
    fn from(config: &Config) -> Self {
        Self {
            profile_hosts: config
                .platform
                .profile_hosts
                .iter()
                .map(|h| h.to_lowercase())
                .collect(),
            require_at_label: config.directory.require_at_label,
        }
    }
}

/// Profile-link extractor for directory pages
#[derive(Debug, Clone, Default)]
pub struct HandleExtractor {
    options: ExtractorOptions,
}

impl HandleExtractor {
    #[must_use]
    pub fn new(options: ExtractorOptions) -> Self {
        Self { options }
    }

    /// Extract canonical handles linked from a page
    ///
    /// # Examples
    ///
    /// ```
    /// use glasswall::parser::HandleExtractor;
    ///
    /// let extractor = HandleExtractor::default();
    /// let html = r#"<a href="https://x.com/Alice">@Alice</a><a href="https://x.com/home">Home</a>"#;
    /// let handles = extractor.extract(html);
    /// assert_eq!(handles.len(), 1);
    /// assert!(handles.iter().any(|h| h.as_str() == "alice"));
    /// ```
    pub fn extract(&self, html: &str) -> HandleSet {
        let document = Html::parse_document(html);

        if is_error_page(&document) {
            tracing::debug!("Skipping error or interstitial page");
            return HandleSet::new();
        }

        let mut handles = HandleSet::new();
        for link in document.select(&LINK) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };

            if self.options.require_at_label {
                let label = link.text().collect::<String>();
                if !label.trim().starts_with('@') {
                    continue;
                }
            }

            if let Some(handle) = self.profile_handle(href) {
                handles.insert(handle);
            }
        }

        handles
    }

    /// Return the handle a link points at, if it is a profile link
    ///
    /// Accepts `https://{host}/{name}` where `host` is a profile host and `name`
    /// is a single segment of word characters that is not a reserved route.
    pub fn profile_handle(&self, href: &str) -> Option<Handle> {
        let href = href.trim();
        let lowered = href.to_lowercase();

        if STATUS_MARKERS.iter().any(|m| lowered.contains(m))
            || HASHTAG_MARKERS.iter().any(|m| lowered.contains(m))
        {
            return None;
        }

        let absolute = if href.starts_with("//") {
            format!("https:{href}")
        } else {
            href.to_string()
        };
        let url = Url::parse(&absolute).ok()?;

        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }

        let host = url.host_str()?.to_lowercase();
        if !self.options.profile_hosts.iter().any(|h| *h == host) {
            return None;
        }

        let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
        let name = segments.next()?;
        if segments.next().is_some() {
            return None;
        }

        if !is_word(name) || RESERVED_PATHS.contains(name.to_lowercase().as_str()) {
            return None;
        }

        Some(Handle::new(name))
    }
}

/// Whether the document title marks an error, not-found or interstitial page
fn is_error_page(document: &Html) -> bool {
    document
        .select(&TITLE)
        .next()
        .map(|title| {
            let text = title.text().collect::<String>().to_lowercase();
            ERROR_TITLE_MARKERS.iter().any(|m| text.contains(m))
        })
        .unwrap_or(false)
}

fn is_word(segment: &str) -> bool {
    static WORD_RE: OnceLock<Regex> = OnceLock::new();

    let re =
        WORD_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("Invalid regex pattern"));

    re.is_match(segment)
}

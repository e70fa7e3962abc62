//! CSS selectors and fixed word lists for directory pages

use lazy_static::lazy_static;
use scraper::Selector;
use std::collections::HashSet;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    /// Every hyperlink with a target
    pub static ref LINK: Selector = parse_selector!("a[href]");

    /// Document title
    pub static ref TITLE: Selector = parse_selector!("title");

    /// First-segment routes on the platform that are not user profiles
    pub static ref RESERVED_PATHS: HashSet<&'static str> = [
        "home",
        "explore",
        "search",
        "notifications",
        "messages",
        "settings",
        "compose",
        "login",
        "logout",
        "signup",
        "i",
        "intent",
        "share",
        "hashtag",
        "tos",
        "privacy",
        "about",
        "download",
        "jobs",
        "account",
        "lists",
        "bookmarks",
        "communities",
        "premium",
        "verified",
        "help",
        "status",
        "who_to_follow",
        "following",
        "followers",
    ]
    .into_iter()
    .collect();
}

/// Substrings marking a link to a single post
pub const STATUS_MARKERS: &[&str] = &["/status/", "/statuses/"];

/// Substrings marking a hashtag link
pub const HASHTAG_MARKERS: &[&str] = &["/hashtag/", "%23"];

/// Title fragments of error, not-found and interstitial pages
pub const ERROR_TITLE_MARKERS: &[&str] = &[
    "not found",
    "error 404",
    "server error",
    "just a moment",
    "attention required",
    "access denied",
];

//! HTML parsing for directory pages
//!
//! - [`handles`] - profile-link extraction into canonical handles
//! - [`selectors`] - CSS selectors and reserved word lists

pub mod handles;
pub mod selectors;

pub use handles::{ExtractorOptions, HandleExtractor};

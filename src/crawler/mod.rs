//! Fetching from the external directory
//!
//! - [`fetcher`] - HTTP transport trait and reqwest-backed implementation
//! - [`headers`] - request header sets for the directory and the platform API
//! - [`directory`] - parallel-window crawl of the directory's numbered pages

pub mod directory;
pub mod fetcher;
pub mod headers;

pub use directory::{CrawlPolicy, CrawlReport, CrawlStop, DirectoryCrawler};
pub use fetcher::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

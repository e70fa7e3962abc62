//! Social platform integration
//!
//! - [`credentials`] - injected session credentials
//! - [`client`] - authenticated mute-list and mute-create calls
//! - [`mutes`] - cursor-paginated reader for the existing mute list

pub mod client;
pub mod credentials;
pub mod mutes;

pub use client::{MutePage, PlatformClient};
pub use credentials::{CredentialProvider, Credentials, EnvCredentialProvider};
pub use mutes::{ExistingListReader, ExistingSet, ListTermination, ReaderPolicy};

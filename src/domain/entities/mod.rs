//! Core business entities.

pub mod stats;
pub mod url_record;

pub use stats::Stats;
pub use url_record::{BatchShortUrl, BatchUrl, OwnedUrl, PendingDeletion, UrlRecord};

//! DTOs for a user's own URLs.

use serde::{Deserialize, Serialize};

use crate::domain::entities::OwnedUrl;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserUrlResponse {
    pub short_url: String,
    pub original_url: String,
}

impl From<OwnedUrl> for UserUrlResponse {
    fn from(url: OwnedUrl) -> Self {
        Self {
            short_url: url.short_url,
            original_url: url.original_url,
        }
    }
}

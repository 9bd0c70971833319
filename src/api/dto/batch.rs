//! DTOs for batch shortening.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::{BatchShortUrl, BatchUrl};

#[derive(Debug, Deserialize, Validate)]
pub struct BatchItemRequest {
    pub correlation_id: Option<String>,

    #[validate(url(message = "Invalid URL format"))]
    pub original_url: String,
}

impl From<BatchItemRequest> for BatchUrl {
    fn from(item: BatchItemRequest) -> Self {
        Self {
            correlation_id: item.correlation_id,
            original_url: item.original_url,
        }
    }
}

/// One shortened item, echoing the caller's correlation id.
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchItemResponse {
    pub correlation_id: Option<String>,
    pub short_url: String,
}

impl From<BatchShortUrl> for BatchItemResponse {
    fn from(item: BatchShortUrl) -> Self {
        Self {
            correlation_id: item.correlation_id,
            short_url: item.short_url,
        }
    }
}

//! DTO for service-wide statistics.

use serde::{Deserialize, Serialize};

use crate::domain::entities::Stats;

/// Number of stored URLs and known users.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsResponse {
    pub urls: i64,
    pub users: i64,
}

impl From<Stats> for StatsResponse {
    fn from(stats: Stats) -> Self {
        Self {
            urls: stats.urls,
            users: stats.users,
        }
    }
}

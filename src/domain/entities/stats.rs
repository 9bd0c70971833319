use serde::Serialize;

/// Aggregate counts over the whole deployment, computed on demand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub urls: i64,
    pub users: i64,
}

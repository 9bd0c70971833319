//! Shared application state injected into handlers and middleware.

use std::sync::Arc;

use crate::api::middleware::trusted::TrustedNetworks;
use crate::application::services::{CredentialService, ShortenerService};
use crate::domain::deletion_worker::DeletionQueue;
use crate::domain::repositories::Storage;
use crate::utils::alias_generator::RandomAliasGenerator;

#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<ShortenerService<dyn Storage>>,
    pub credentials: Arc<CredentialService<dyn Storage>>,
    pub trusted_networks: Arc<TrustedNetworks>,
}

impl AppState {
    /// Wires both services to one storage backend.
    ///
    /// # Arguments
    ///
    /// - `storage` - backend for URLs and users
    /// - `deletions` - sending half of the deletion worker's queue
    /// - `base_url` - prefix for short URLs
    /// - `secret` - key material for session tokens
    /// - `trusted_networks` - callers allowed on internal endpoints
    pub fn new(
        storage: Arc<dyn Storage>,
        deletions: DeletionQueue,
        base_url: &str,
        secret: &str,
        trusted_networks: TrustedNetworks,
    ) -> Self {
        Self {
            shortener: Arc::new(ShortenerService::new(
                storage.clone(),
                Box::new(RandomAliasGenerator::default()),
                base_url,
                deletions,
            )),
            credentials: Arc::new(CredentialService::new(storage, secret)),
            trusted_networks: Arc::new(trusted_networks),
        }
    }
}

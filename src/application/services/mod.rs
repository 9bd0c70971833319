//! Business logic services for the application layer.

pub mod credential_service;
pub mod shortener_service;

pub use credential_service::{CredentialService, Identity};
pub use shortener_service::{ShortenerService, Stored};

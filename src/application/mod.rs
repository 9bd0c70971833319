//! Application layer services implementing business logic.
//!
//! Services coordinate repository calls and validation and are what HTTP
//! handlers talk to. They are generic over the repository traits so tests can
//! run them against mocks or the in-memory backend.
//!
//! # Available Services
//!
//! - [`services::shortener_service::ShortenerService`] - Shortening, lookup, batch and deletion
//! - [`services::credential_service::CredentialService`] - Session tokens and user identities

pub mod services;

//! Repository trait definitions for the domain layer.
//!
//! Traits define the storage contract; implementations live in
//! `crate::infrastructure::persistence`. Mocks are generated via `mockall`
//! for unit tests.
//!
//! - [`UrlRepository`] - URL records plus insert/delete buffers
//! - [`UserRepository`] - User identity minting and verification
//! - [`Storage`] - Both of the above, used where one backend serves everything

pub mod url_repository;
pub mod user_repository;

pub use url_repository::UrlRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use url_repository::MockUrlRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;

/// A backend that stores both URLs and users.
pub trait Storage: UrlRepository + UserRepository {}

impl<T: UrlRepository + UserRepository> Storage for T {}

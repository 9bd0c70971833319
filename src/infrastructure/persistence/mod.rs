//! Storage backend implementations.
//!
//! Every backend implements [`crate::domain::repositories::UrlRepository`] and
//! [`crate::domain::repositories::UserRepository`].
//!
//! # Backends
//!
//! - [`PgStorage`] - PostgreSQL, buffered inserts and soft deletes in transactions
//! - [`MemoryStorage`] - Process-local map, used for tests and ephemeral runs
//! - [`FileStorage`] - In-memory index persisted as a JSON-lines journal
//!
//! [`InsertBuffer`] and [`DeleteBuffer`] are shared by the buffered backends.

pub mod buffer;
pub mod file_storage;
pub mod memory_storage;
pub mod pg_storage;

pub use buffer::{BatchWriter, DeleteBuffer, InsertBuffer};
pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;
pub use pg_storage::PgStorage;

//! Domain layer containing business entities and logic.
//!
//! Defines the entities, the storage contracts and the background deletion
//! worker, independent of any concrete backend or transport.
//!
//! # Architecture
//!
//! - [`entities`] - URL records, batch items and aggregate stats
//! - [`repositories`] - Storage trait definitions
//! - [`deletion_worker`] - Queue and background consumer for soft deletes
//!
//! # Deletion Flow
//!
//! 1. A handler asks [`crate::application::services::ShortenerService`] to delete aliases
//! 2. The request is pushed onto a [`deletion_worker::DeletionQueue`]
//! 3. [`deletion_worker::run_deletion_worker`] moves each alias into the storage delete buffer
//! 4. The buffer is flushed in one transaction

pub mod deletion_worker;
pub mod entities;
pub mod repositories;

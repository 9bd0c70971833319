//! Utility functions shared across layers.
//!
//! - [`alias_generator`] - Short alias generation
//! - [`db_error`] - Database error classification helpers

pub mod alias_generator;
pub mod db_error;

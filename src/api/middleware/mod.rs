//! HTTP middleware for request processing and protection.
//!
//! Provides session ownership, trusted-network filtering and request tracing.

pub mod ownership;
pub mod tracing;
pub mod trusted;

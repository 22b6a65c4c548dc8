//! Tracing/logging setup shared by registry processes and tests.

/// Tracing configuration (filters, formatters).
pub mod tracing;

pub use crate::tracing::{init, init_test};

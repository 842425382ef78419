//! Process-wide tracing setup shared by micros binaries.

/// Tracing subscriber configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{LogFormat, init, init_with};

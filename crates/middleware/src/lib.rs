//! `micros-middleware` — axum integration for `micros-auth`.
//!
//! The host decides which routes are protected; this crate only provides the
//! layer, the extractor and the error rendering.

pub mod extract;
pub mod layer;
pub mod rejection;

pub use extract::Authenticated;
pub use layer::{AuthState, auth_middleware, metadata_from_headers};
pub use rejection::AuthRejection;

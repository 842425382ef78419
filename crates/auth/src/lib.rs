//! `micros-auth` — bearer token authentication and claims-based authorization.
//!
//! This crate is intentionally decoupled from any transport: hosts hand it
//! request [`Metadata`] and get back a [`RequestContext`] carrying validated
//! [`Claims`].

pub mod authenticate;
pub mod authorize;
pub mod claims;
pub mod config;
pub mod context;
pub mod error;
pub mod metadata;
pub mod registry;
pub mod token;

pub use authenticate::Authenticator;
pub use authorize::{Authorizer, is_group_allowed};
pub use claims::{Claims, Payload, RESERVED_PAYLOAD_FIELDS};
pub use config::AuthConfig;
pub use context::{RequestContext, TAG_AUTH_GROUP, TAG_AUTH_SUBJECT, Tags};
pub use error::{AuthError, AuthResult, ConfigError, ErrorKind, TokenError};
pub use metadata::{AUTHORIZATION_HEADER, BEARER_SCHEME, Metadata, bearer_token};
pub use registry::AdminRegistry;
pub use token::Hs256Codec;

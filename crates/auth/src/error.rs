//! Error model for authentication and authorization.
//!
//! Three layers:
//! - [`ConfigError`]: construction-time failures; the host must not start.
//! - [`TokenError`]: precise decode/verify classification, kept for
//!   diagnostics only.
//! - [`AuthError`]: what callers (and ultimately the wire) observe.

use thiserror::Error;

/// Result type used across the auth core.
pub type AuthResult<T> = Result<T, AuthError>;

/// Invalid authenticator configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing jwt signing key")]
    MissingSigningKey,

    #[error("missing jwt issuer")]
    MissingIssuer,

    #[error("missing jwt audience")]
    MissingAudience,
}

/// Why a token failed to encode or verify.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not three base64url segments, or segments that are not the expected JSON.
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("invalid token issuer")]
    InvalidIssuer,

    #[error("invalid token audience")]
    InvalidAudience,

    /// The header names an algorithm other than HS256.
    #[error("unsupported token algorithm")]
    UnsupportedAlgorithm,

    #[error("failed to encode token: {0}")]
    Encoding(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind as JwtErrorKind;

        match err.kind() {
            JwtErrorKind::InvalidSignature => Self::InvalidSignature,
            JwtErrorKind::ExpiredSignature => Self::Expired,
            JwtErrorKind::InvalidIssuer => Self::InvalidIssuer,
            JwtErrorKind::InvalidAudience => Self::InvalidAudience,
            JwtErrorKind::InvalidAlgorithm | JwtErrorKind::MissingAlgorithm => {
                Self::UnsupportedAlgorithm
            }
            _ => Self::Malformed(err.to_string()),
        }
    }
}

/// Externally observable error classes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Unauthenticated,
    PermissionDenied,
    DeadlineExceeded,
}

/// Error returned by the authenticator and authorizer.
///
/// The `Display` output is safe to send to the caller: token failures all
/// render the same message, and the precise [`TokenError`] is only reachable
/// through `source()`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("{message}")]
    Unauthenticated {
        message: String,
        #[source]
        source: Option<TokenError>,
    },

    #[error("{0}")]
    PermissionDenied(String),

    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl AuthError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
            source: None,
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    /// Collapse a token failure into the uniform `Unauthenticated` error.
    pub fn invalid_session(cause: TokenError) -> Self {
        Self::Unauthenticated {
            message: "session expired".to_string(),
            source: Some(cause),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Unauthenticated { .. } => ErrorKind::Unauthenticated,
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Self::DeadlineExceeded => ErrorKind::DeadlineExceeded,
        }
    }

    /// The internal token failure, if this error came from token verification.
    pub fn token_error(&self) -> Option<&TokenError> {
        match self {
            Self::Unauthenticated { source, .. } => source.as_ref(),
            _ => None,
        }
    }
}

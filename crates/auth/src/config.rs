//! Authenticator configuration.

use std::fmt;

use serde::Deserialize;

pub const ENV_SIGNING_KEY: &str = "MICROS_JWT_SIGNING_KEY";
pub const ENV_ISSUER: &str = "MICROS_JWT_ISSUER";
pub const ENV_AUDIENCE: &str = "MICROS_JWT_AUDIENCE";
pub const ENV_ADMIN_GROUPS: &str = "MICROS_ADMIN_GROUPS";
pub const ENV_SUPER_ADMIN_GROUPS: &str = "MICROS_SUPER_ADMIN_GROUPS";

/// Settings needed to build an [`crate::Authenticator`].
///
/// Values are not validated here; [`crate::Authenticator::from_config`]
/// rejects an empty key, issuer or audience.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub signing_key: String,
    pub issuer: String,
    pub audience: String,
    pub admin_groups: Vec<String>,
    pub super_admin_groups: Vec<String>,
}

impl AuthConfig {
    /// Read configuration from `MICROS_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Group lists are comma-separated; blank entries are skipped.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let list = |key: &str| -> Vec<String> {
            lookup(key)
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|g| !g.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default()
        };

        Self {
            signing_key: lookup(ENV_SIGNING_KEY).unwrap_or_default(),
            issuer: lookup(ENV_ISSUER).unwrap_or_default(),
            audience: lookup(ENV_AUDIENCE).unwrap_or_default(),
            admin_groups: list(ENV_ADMIN_GROUPS),
            super_admin_groups: list(ENV_SUPER_ADMIN_GROUPS),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_key", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("admin_groups", &self.admin_groups)
            .field("super_admin_groups", &self.super_admin_groups)
            .finish()
    }
}

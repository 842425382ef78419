//! Inbound request metadata and bearer credential extraction.

use std::collections::BTreeMap;

use crate::error::{AuthError, AuthResult};

/// Metadata key carrying the credential.
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Credential scheme expected in front of the token.
pub const BEARER_SCHEME: &str = "Bearer";

/// Case-insensitive request metadata (keys are stored lower-case).
///
/// A key may carry several values; lookups return the first one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: BTreeMap<String, Vec<String>>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata carrying `authorization: Bearer <token>`.
    pub fn from_jwt(token: &str) -> Self {
        let mut md = Self::new();
        md.insert(AUTHORIZATION_HEADER, format!("{BEARER_SCHEME} {token}"));
        md
    }

    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .entry(key.as_ref().to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .get(&key.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str())))
    }
}

impl<K, V> FromIterator<(K, V)> for Metadata
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut md = Self::new();
        for (k, v) in iter {
            md.insert(k, v);
        }
        md
    }
}

/// Extract the bearer token from `authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively. A missing key, another scheme or
/// an empty token are all `Unauthenticated`.
pub fn bearer_token(md: &Metadata) -> AuthResult<&str> {
    let value = md
        .get(AUTHORIZATION_HEADER)
        .ok_or_else(|| AuthError::unauthenticated("request unauthenticated with bearer"))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| AuthError::unauthenticated("bad authorization string"))?;

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(AuthError::unauthenticated(
            "request unauthenticated with bearer",
        ));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::unauthenticated("bad authorization string"));
    }

    Ok(token)
}

//! Per-call request context.
//!
//! A [`RequestContext`] is an immutable value owned by a single call. The
//! claims slot is filled only by [`crate::Authenticator`], which returns a
//! child context; the parent is never modified, so concurrent calls cannot
//! observe each other's claims.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::claims::{Claims, Payload};
use crate::error::{AuthError, AuthResult};
use crate::metadata::Metadata;

/// Tag recording the authenticated subject.
pub const TAG_AUTH_SUBJECT: &str = "auth.sub";

/// Tag recording the authenticated primary group.
pub const TAG_AUTH_GROUP: &str = "auth.group";

/// Observability annotations attached to a call.
pub type Tags = BTreeMap<String, String>;

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    metadata: Arc<Metadata>,
    claims: Option<Arc<Claims>>,
    tags: Tags,
    deadline: Option<DateTime<Utc>>,
}

impl RequestContext {
    pub fn new(metadata: Metadata) -> Self {
        Self {
            metadata: Arc::new(metadata),
            ..Self::default()
        }
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub(crate) fn with_claims(&self, claims: Claims) -> Self {
        let mut child = self.clone();
        child
            .tags
            .insert(TAG_AUTH_SUBJECT.to_string(), claims.payload.id.clone());
        child
            .tags
            .insert(TAG_AUTH_GROUP.to_string(), claims.payload.group.clone());
        child.claims = Some(Arc::new(claims));
        child
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn is_authenticated(&self) -> bool {
        self.claims.is_some()
    }

    /// Validated claims; `Unauthenticated` if the call was never authenticated.
    pub fn claims(&self) -> AuthResult<&Claims> {
        self.claims
            .as_deref()
            .ok_or_else(|| AuthError::unauthenticated("no claims found in token"))
    }

    pub fn payload(&self) -> AuthResult<&Payload> {
        self.claims().map(|c| &c.payload)
    }
}

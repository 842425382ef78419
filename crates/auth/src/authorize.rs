use std::sync::Arc;

use crate::claims::Payload;
use crate::context::RequestContext;
use crate::error::{AuthError, AuthResult};
use crate::registry::AdminRegistry;

/// Claims-based authorization over an already authenticated context.
///
/// - No IO
/// - No panics
/// - Never authenticates: a context without claims is `Unauthenticated`
#[derive(Debug, Clone, Default)]
pub struct Authorizer {
    admins: Arc<AdminRegistry>,
}

impl Authorizer {
    pub fn new(admins: Arc<AdminRegistry>) -> Self {
        Self { admins }
    }

    pub fn admins(&self) -> &AdminRegistry {
        &self.admins
    }

    /// Allow the call if the caller's primary group, or failing that one of
    /// its roles, is in `allowed`.
    pub fn authorize_groups<'a, S: AsRef<str>>(
        &self,
        ctx: &'a RequestContext,
        allowed: &[S],
    ) -> AuthResult<&'a Payload> {
        let claims = ctx.claims()?;

        let result = match_group(&claims.payload.group, allowed).or_else(|denied| {
            if claims.roles.is_empty() {
                Err(denied)
            } else {
                match_roles(&claims.roles, allowed)
            }
        });

        if let Err(err) = &result {
            tracing::debug!(
                subject = %claims.payload.id,
                error = %err,
                "group authorization denied"
            );
        }
        result.map(|()| &claims.payload)
    }

    /// Allow the call if the caller's id exactly equals one of `allowed`.
    pub fn authorize_ids<'a, S: AsRef<str>>(
        &self,
        ctx: &'a RequestContext,
        allowed: &[S],
    ) -> AuthResult<&'a Payload> {
        let claims = ctx.claims()?;

        if allowed.iter().any(|id| id.as_ref() == claims.id) {
            return Ok(&claims.payload);
        }

        tracing::debug!(actor_id = %claims.id, "id authorization denied");
        Err(AuthError::permission_denied(format!(
            "permission denied for actor id {}",
            claims.id
        )))
    }

    pub fn is_group_allowed<S: AsRef<str>>(&self, group: &str, allowed: &[S]) -> bool {
        is_group_allowed(group, allowed)
    }

    pub fn is_admin(&self, group: &str) -> bool {
        self.admins.is_admin(group)
    }

    pub fn is_super_admin(&self, group: &str) -> bool {
        self.admins.is_super_admin(group)
    }
}

/// Pure membership test, usable outside a request.
pub fn is_group_allowed<S: AsRef<str>>(group: &str, allowed: &[S]) -> bool {
    allowed.iter().any(|g| g.as_ref() == group)
}

fn match_group<S: AsRef<str>>(group: &str, allowed: &[S]) -> AuthResult<()> {
    if is_group_allowed(group, allowed) {
        Ok(())
    } else {
        Err(AuthError::permission_denied(format!(
            "permission denied for group {group}"
        )))
    }
}

fn match_roles<S: AsRef<str>>(roles: &[String], allowed: &[S]) -> AuthResult<()> {
    if roles.iter().any(|role| is_group_allowed(role, allowed)) {
        Ok(())
    } else {
        Err(AuthError::permission_denied(format!(
            "permission denied for groups {}",
            roles.join(",")
        )))
    }
}

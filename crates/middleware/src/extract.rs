use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use micros_auth::{AuthError, RequestContext};

use crate::rejection::AuthRejection;

/// The authenticated context placed in the request by [`crate::auth_middleware`].
///
/// Rejects with `401` on routes where the middleware did not run.
#[derive(Debug, Clone)]
pub struct Authenticated(pub RequestContext);

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .filter(|ctx| ctx.is_authenticated())
            .cloned()
            .map(Authenticated)
            .ok_or_else(|| AuthRejection(AuthError::unauthenticated("no claims found in token")))
    }
}

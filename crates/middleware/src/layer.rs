use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use micros_auth::{Authenticator, Authorizer, Metadata, RequestContext};

use crate::rejection::AuthRejection;

#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Arc<Authenticator>,
}

impl AuthState {
    pub fn new(authenticator: Arc<Authenticator>) -> Self {
        Self { authenticator }
    }

    pub fn authorizer(&self) -> Authorizer {
        self.authenticator.authorizer()
    }
}

/// Authenticate the request before it reaches the handler.
///
/// Install with `axum::middleware::from_fn_with_state` on the routes that
/// require authentication. On success the authenticated [`RequestContext`]
/// is stored in the request extensions.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let inbound = RequestContext::new(metadata_from_headers(req.headers()));
    let ctx = state.authenticator.authenticate(&inbound)?;

    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}

/// Copy HTTP headers into request metadata, skipping non-UTF-8 values.
pub fn metadata_from_headers(headers: &HeaderMap) -> Metadata {
    headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn headers_become_metadata() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc"));
        headers.append("x-tag", HeaderValue::from_static("a"));
        headers.append("x-tag", HeaderValue::from_static("b"));
        headers.insert("x-binary", HeaderValue::from_bytes(b"\xff\xfe").unwrap());

        let md = metadata_from_headers(&headers);
        assert_eq!(md.get("authorization"), Some("Bearer abc"));
        assert_eq!(md.get_all("x-tag"), ["a", "b"]);
        assert_eq!(md.get("x-binary"), None);
    }
}

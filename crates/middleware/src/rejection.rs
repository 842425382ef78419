use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use micros_auth::{AuthError, ErrorKind};

/// HTTP rendering of an [`AuthError`].
///
/// The body is the error's display message only; internal token failure
/// details never reach the client.
#[derive(Debug)]
pub struct AuthRejection(pub AuthError);

impl AuthRejection {
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
            ErrorKind::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            ErrorKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for AuthRejection {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Some(cause) = self.0.token_error() {
            tracing::debug!(%status, cause = %cause, "rejecting request");
        }
        (status, self.0.to_string()).into_response()
    }
}

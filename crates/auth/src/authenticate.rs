//! Request authentication and token issuance.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::authorize::Authorizer;
use crate::claims::{Claims, Payload};
use crate::config::AuthConfig;
use crate::context::RequestContext;
use crate::error::{AuthError, AuthResult, ConfigError, TokenError};
use crate::metadata::bearer_token;
use crate::registry::AdminRegistry;
use crate::token::Hs256Codec;

/// Authenticates inbound calls and mints tokens with one HS256 key.
///
/// Created once at startup and shared (e.g. behind an `Arc`) by every
/// worker. Only the admin registry is mutable after construction.
#[derive(Debug)]
pub struct Authenticator {
    codec: Hs256Codec,
    admins: Arc<AdminRegistry>,
}

impl Authenticator {
    pub fn new(
        signing_key: impl Into<Vec<u8>>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            codec: Hs256Codec::new(signing_key, issuer, audience)?,
            admins: Arc::new(AdminRegistry::new()),
        })
    }

    /// Build from configuration, registering the configured admin groups.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        let auth = Self::new(
            config.signing_key.as_bytes(),
            config.issuer.as_str(),
            config.audience.as_str(),
        )?;
        auth.admins.register_admin_groups(config.admin_groups.iter().cloned());
        auth.admins
            .register_super_admin_groups(config.super_admin_groups.iter().cloned());

        tracing::info!(
            issuer = %config.issuer,
            audience = %config.audience,
            admin_groups = config.admin_groups.len(),
            super_admin_groups = config.super_admin_groups.len(),
            "authenticator configured"
        );
        Ok(auth)
    }

    pub fn codec(&self) -> &Hs256Codec {
        &self.codec
    }

    pub fn signing_key(&self) -> &[u8] {
        self.codec.signing_key()
    }

    pub fn issuer(&self) -> &str {
        self.codec.issuer()
    }

    pub fn audience(&self) -> &str {
        self.codec.audience()
    }

    pub fn admins(&self) -> &AdminRegistry {
        &self.admins
    }

    /// Authorizer sharing this authenticator's admin registry.
    pub fn authorizer(&self) -> Authorizer {
        Authorizer::new(Arc::clone(&self.admins))
    }

    /// Verify the bearer credential in `ctx` and return a child context
    /// carrying its claims.
    ///
    /// The deadline is checked against a fresh clock reading taken after
    /// verification.
    pub fn authenticate(&self, ctx: &RequestContext) -> AuthResult<RequestContext> {
        self.authenticate_with_clock(ctx, None, Utc::now)
    }

    pub fn authenticate_at(
        &self,
        ctx: &RequestContext,
        now: DateTime<Utc>,
    ) -> AuthResult<RequestContext> {
        self.authenticate_with_clock(ctx, None, || now)
    }

    /// Like [`Self::authenticate`], verifying with `signing_key` instead of
    /// the instance key.
    pub fn authenticate_with_key(
        &self,
        ctx: &RequestContext,
        signing_key: &[u8],
    ) -> AuthResult<RequestContext> {
        self.authenticate_with_clock(ctx, Some(signing_key), Utc::now)
    }

    pub fn authenticate_with_key_at(
        &self,
        ctx: &RequestContext,
        signing_key: &[u8],
        now: DateTime<Utc>,
    ) -> AuthResult<RequestContext> {
        self.authenticate_with_clock(ctx, Some(signing_key), || now)
    }

    /// `clock` is read once for expiry and again for the deadline.
    fn authenticate_with_clock(
        &self,
        ctx: &RequestContext,
        signing_key: Option<&[u8]>,
        mut clock: impl FnMut() -> DateTime<Utc>,
    ) -> AuthResult<RequestContext> {
        let token = bearer_token(ctx.metadata())?;
        let decoded = match signing_key {
            Some(key) => self.codec.decode_with_key(token, key, clock()),
            None => self.codec.decode(token, clock()),
        };
        let claims = decoded.map_err(|err| {
            tracing::debug!(
                error = %err,
                supplied_key = signing_key.is_some(),
                "token verification failed"
            );
            AuthError::invalid_session(err)
        })?;
        attach(ctx, claims, clock())
    }

    /// Mint a token for `claims` expiring at `expires_at`.
    ///
    /// Fails only if the claims cannot be serialized.
    pub fn gen_token(
        &self,
        claims: &Claims,
        expires_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        self.codec.encode(claims, expires_at)
    }

    pub fn gen_token_with_key(
        &self,
        claims: &Claims,
        expires_at: DateTime<Utc>,
        signing_key: &[u8],
    ) -> Result<String, TokenError> {
        self.codec.encode_with_key(claims, expires_at, signing_key)
    }

    /// Mint a token carrying only `payload` (no roles, no actor id).
    pub fn gen_token_for_payload(
        &self,
        payload: Payload,
        expires_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        self.gen_token(&Claims::new(payload), expires_at)
    }

    /// Verify a raw token string with the instance key.
    pub fn claims_from_jwt(&self, token: &str) -> AuthResult<Claims> {
        self.codec
            .decode(token, Utc::now())
            .map_err(AuthError::invalid_session)
    }
}

fn attach(
    ctx: &RequestContext,
    claims: Claims,
    now: DateTime<Utc>,
) -> AuthResult<RequestContext> {
    if ctx.deadline().is_some_and(|deadline| now >= deadline) {
        return Err(AuthError::DeadlineExceeded);
    }

    tracing::debug!(
        subject = %claims.payload.id,
        group = %claims.payload.group,
        actor_id = %claims.id,
        "request authenticated"
    );
    Ok(ctx.with_claims(claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{TAG_AUTH_GROUP, TAG_AUTH_SUBJECT};
    use crate::error::ErrorKind;
    use crate::metadata::Metadata;
    use chrono::{Duration, TimeZone};

    const KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn auth() -> Authenticator {
        Authenticator::new(KEY, "micros", "svc").unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn claims() -> Claims {
        Claims::new(Payload::new("u-1", "billing"))
            .with_roles(["ops"])
            .with_id("user-42")
    }

    fn request(token: &str) -> RequestContext {
        RequestContext::new(Metadata::from_jwt(token))
    }

    #[test]
    fn construction_rejects_empty_settings() {
        assert_eq!(
            Authenticator::new(Vec::<u8>::new(), "micros", "svc").unwrap_err(),
            ConfigError::MissingSigningKey
        );
        assert_eq!(
            Authenticator::new(KEY, "", "svc").unwrap_err(),
            ConfigError::MissingIssuer
        );
        assert_eq!(
            Authenticator::new(KEY, "micros", "").unwrap_err(),
            ConfigError::MissingAudience
        );
    }

    #[test]
    fn authenticate_attaches_claims_and_tags() {
        let auth = auth();
        let token = auth.gen_token(&claims(), now() + Duration::hours(1)).unwrap();

        let ctx = auth.authenticate_at(&request(&token), now()).unwrap();

        let attached = ctx.claims().unwrap();
        assert_eq!(attached.payload.group, "billing");
        assert_eq!(attached.id, "user-42");
        assert_eq!(attached.issuer, "micros");
        assert_eq!(ctx.tags().get(TAG_AUTH_SUBJECT).map(String::as_str), Some("u-1"));
        assert_eq!(ctx.tags().get(TAG_AUTH_GROUP).map(String::as_str), Some("billing"));
    }

    #[test]
    fn missing_credential_is_unauthenticated() {
        let err = auth()
            .authenticate_at(&RequestContext::new(Metadata::new()), now())
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
        assert_eq!(err.token_error(), None);
    }

    #[test]
    fn token_failures_collapse_to_one_message() {
        let auth = auth();
        let expired = auth.gen_token(&claims(), now() - Duration::hours(1)).unwrap();
        let forged = auth
            .gen_token_with_key(&claims(), now() + Duration::hours(1), b"not-the-key")
            .unwrap();

        let cases = [
            (expired.as_str(), TokenError::Expired),
            (forged.as_str(), TokenError::InvalidSignature),
        ];

        let mut messages = Vec::new();
        for (token, cause) in cases {
            let err = auth.authenticate_at(&request(token), now()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unauthenticated);
            assert_eq!(err.token_error(), Some(&cause));
            messages.push(err.to_string());
        }

        let err = auth.authenticate_at(&request("garbage"), now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
        assert!(matches!(err.token_error(), Some(TokenError::Malformed(_))));
        messages.push(err.to_string());

        messages.dedup();
        assert_eq!(messages, vec!["session expired"]);
    }

    #[test]
    fn authenticate_with_supplied_key() {
        let auth = auth();
        let tenant_key = b"tenant-key-tenant-key-tenant-key";
        let token = auth
            .gen_token_with_key(&claims(), now() + Duration::hours(1), tenant_key)
            .unwrap();

        assert!(auth.authenticate_at(&request(&token), now()).is_err());
        let ctx = auth
            .authenticate_with_key_at(&request(&token), tenant_key, now())
            .unwrap();
        assert_eq!(ctx.payload().unwrap().id, "u-1");
    }

    #[test]
    fn passed_deadline_aborts_after_verification() {
        let auth = auth();
        let token = auth.gen_token(&claims(), now() + Duration::hours(1)).unwrap();
        let ctx = request(&token).with_deadline(now() - Duration::milliseconds(1));

        let err = auth.authenticate_at(&ctx, now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeadlineExceeded);

        let ctx = request(&token).with_deadline(now() + Duration::seconds(5));
        assert!(auth.authenticate_at(&ctx, now()).is_ok());
    }

    #[test]
    fn deadline_passing_during_verification_is_seen() {
        let auth = auth();
        let token = auth.gen_token(&claims(), now() + Duration::hours(1)).unwrap();
        let ctx = request(&token).with_deadline(now() + Duration::milliseconds(10));

        let mut readings = [now(), now() + Duration::milliseconds(20)].into_iter();
        let err = auth
            .authenticate_with_clock(&ctx, None, || readings.next().unwrap_or_else(now))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DeadlineExceeded);

        // A single fixed instant before the deadline passes.
        assert!(auth.authenticate_at(&ctx, now()).is_ok());
    }

    #[test]
    fn empty_supplied_key_never_verifies() {
        let auth = auth();
        let token = auth.gen_token(&claims(), now() + Duration::hours(1)).unwrap();

        let err = auth
            .authenticate_with_key_at(&request(&token), b"", now())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
        assert_eq!(err.token_error(), Some(&TokenError::InvalidSignature));
    }

    #[test]
    fn payload_only_tokens_and_raw_parsing() {
        let auth = auth();
        let token = auth
            .gen_token_for_payload(Payload::new("u-9", "eng"), Utc::now() + Duration::minutes(5))
            .unwrap();

        let parsed = auth.claims_from_jwt(&token).unwrap();
        assert_eq!(parsed.payload.id, "u-9");
        assert!(parsed.roles.is_empty());
        assert!(parsed.id.is_empty());

        let err = auth.claims_from_jwt("a.b.c").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    }

    #[test]
    fn from_config_registers_admin_groups() {
        let config = AuthConfig {
            signing_key: "k".repeat(32),
            issuer: "micros".into(),
            audience: "svc".into(),
            admin_groups: vec!["ops".into()],
            super_admin_groups: vec!["root".into()],
        };

        let auth = Authenticator::from_config(&config).unwrap();
        let authz = auth.authorizer();
        assert!(authz.is_admin("ops"));
        assert!(authz.is_admin("root"));
        assert!(authz.is_super_admin("root"));
        assert!(!authz.is_super_admin("ops"));
        assert_eq!(auth.signing_key(), config.signing_key.as_bytes());

        let err = Authenticator::from_config(&AuthConfig::default()).unwrap_err();
        assert_eq!(err, ConfigError::MissingSigningKey);
    }

    #[test]
    fn authorizer_sees_later_registrations() {
        let auth = auth();
        let authz = auth.authorizer();
        assert!(!authz.is_admin("ops"));

        auth.admins().register_admin_groups(["ops"]);
        assert!(authz.is_admin("ops"));
    }

    #[test]
    fn authenticator_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Authenticator>();
        assert_send_sync::<RequestContext>();
    }
}

//! HS256 token codec.
//!
//! The algorithm is fixed per codec. The token header is only ever checked
//! against it, never used to pick a verifier, so `alg: none` and other
//! algorithms are rejected.

use std::fmt;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::claims::Claims;
use crate::error::{ConfigError, TokenError};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Keys shorter than this still work but get a warning at construction.
const RECOMMENDED_KEY_LEN: usize = 32;

/// Signs and verifies [`Claims`] with a single symmetric key.
#[derive(Clone)]
pub struct Hs256Codec {
    signing_key: Vec<u8>,
    issuer: String,
    audience: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Hs256Codec {
    pub fn new(
        signing_key: impl Into<Vec<u8>>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let signing_key = signing_key.into();
        let issuer = issuer.into();
        let audience = audience.into();

        if signing_key.is_empty() {
            return Err(ConfigError::MissingSigningKey);
        }
        if issuer.is_empty() {
            return Err(ConfigError::MissingIssuer);
        }
        if audience.is_empty() {
            return Err(ConfigError::MissingAudience);
        }
        if signing_key.len() < RECOMMENDED_KEY_LEN {
            tracing::warn!(
                key_len = signing_key.len(),
                "jwt signing key is shorter than recommended ({RECOMMENDED_KEY_LEN} bytes)"
            );
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(&signing_key),
            decoding_key: DecodingKey::from_secret(&signing_key),
            signing_key,
            issuer,
            audience,
        })
    }

    pub fn signing_key(&self) -> &[u8] {
        &self.signing_key
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Sign `claims` with the codec key, expiring at `expires_at`.
    pub fn encode(
        &self,
        claims: &Claims,
        expires_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        self.encode_inner(claims, expires_at, &self.encoding_key)
    }

    /// Sign `claims` with an explicitly supplied key.
    pub fn encode_with_key(
        &self,
        claims: &Claims,
        expires_at: DateTime<Utc>,
        signing_key: &[u8],
    ) -> Result<String, TokenError> {
        if signing_key.is_empty() {
            return Err(TokenError::Encoding("empty signing key".to_string()));
        }
        self.encode_inner(claims, expires_at, &EncodingKey::from_secret(signing_key))
    }

    /// Verify `token` against the codec key and return its claims.
    pub fn decode(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        self.decode_inner(token, &self.decoding_key, now)
    }

    /// Verify `token` against an explicitly supplied key (rotation, multi-tenant keys).
    pub fn decode_with_key(
        &self,
        token: &str,
        signing_key: &[u8],
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        if signing_key.is_empty() {
            return Err(TokenError::InvalidSignature);
        }
        self.decode_inner(token, &DecodingKey::from_secret(signing_key), now)
    }

    fn encode_inner(
        &self,
        claims: &Claims,
        expires_at: DateTime<Utc>,
        key: &EncodingKey,
    ) -> Result<String, TokenError> {
        // A flattened extension key equal to `id` or `group` would serialize
        // a duplicate key that no decoder accepts.
        if let Some(key) = claims.payload.reserved_field() {
            return Err(TokenError::Encoding(format!(
                "payload field `{key}` is reserved"
            )));
        }

        let mut claims = claims.clone();
        claims.issuer = self.issuer.clone();
        claims.audience = self.audience.clone();
        claims.expires_at = expires_at;

        jsonwebtoken::encode(&Header::new(ALGORITHM), &claims, key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    fn decode_inner(
        &self,
        token: &str,
        key: &DecodingKey,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, key, &self.validation())?;
        let claims = data.claims;

        // Expiry is checked here against the caller's clock, with no leeway.
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        validation
    }
}

impl fmt::Debug for Hs256Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hs256Codec")
            .field("signing_key", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

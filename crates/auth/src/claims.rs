use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload keys owned by the typed fields of [`Payload`].
pub const RESERVED_PAYLOAD_FIELDS: [&str; 2] = ["id", "group"];

/// Identity attributes asserted by the token issuer.
///
/// `extra` carries arbitrary extension fields; they are flattened into the
/// same JSON object as `id` and `group`, so neither may be used as an
/// extension key. The token codec refuses to sign such a payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub id: String,

    /// Primary group, checked first by group authorization.
    #[serde(default)]
    pub group: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Payload {
    pub fn new(id: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            group: group.into(),
            extra: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// First extension key that collides with a typed field, if any.
    pub fn reserved_field(&self) -> Option<&str> {
        RESERVED_PAYLOAD_FIELDS
            .into_iter()
            .find(|key| self.extra.contains_key(*key))
    }
}

/// Signed claim set carried by a bearer token.
///
/// `issuer`, `audience` and `expires_at` are stamped by the token codec at
/// issuance; whatever the caller put there is overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub payload: Payload,

    /// Secondary membership set, consulted when the primary group does not match.
    #[serde(default)]
    pub roles: Vec<String>,

    /// Actor identity used for identity-based authorization.
    #[serde(rename = "sub", default)]
    pub id: String,

    #[serde(rename = "iss", default)]
    pub issuer: String,

    #[serde(rename = "aud", default)]
    pub audience: String,

    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl Claims {
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            roles: Vec::new(),
            id: String::new(),
            issuer: String::new(),
            audience: String::new(),
            expires_at: DateTime::<Utc>::default(),
        }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Whether the claims are expired at `now` (expiry instant inclusive).
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

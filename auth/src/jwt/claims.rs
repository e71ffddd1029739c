use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Issuer of access and custom tokens.
pub const ACCESS_ISSUER: &str = "authkit";

/// Audience of access and custom tokens.
pub const ACCESS_AUDIENCE: &str = "authkit-users";

/// Issuer and audience of refresh tokens.
pub const REFRESH_SCOPE: &str = "authkit-refresh";

/// `aud` claim value, a single string or a list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

impl From<&str> for Audience {
    fn from(audience: &str) -> Self {
        Audience::Single(audience.to_string())
    }
}

/// Validity window the JWT handler checks on every decode.
pub trait RegisteredClaims {
    fn not_before(&self) -> Option<i64>;
    fn expires_at(&self) -> Option<i64>;
}

/// User fields copied into an access token at issuance.
#[derive(Debug, Clone, Copy)]
pub struct TokenSubject<'a> {
    pub user_id: &'a str,
    pub email: &'a str,
    pub role: &'a str,
    pub permissions: &'a [String],
    pub metadata: &'a HashMap<String, Value>,
}

/// Access token claims.
///
/// A point-in-time snapshot of the user record: role and permissions are
/// never re-read from storage while the token is valid, so a role change only
/// takes effect at the next login or refresh.
///
/// Every field defaults when absent so custom tokens decode into the same
/// type; keys without a dedicated field land in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Claims {
    #[serde(default)]
    pub user_id: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub role: String,

    #[serde(default)]
    pub permissions: Vec<String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,

    /// JWT ID (unique token identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Subject (user identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Audience
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,

    /// Issued at (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Not before (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Expiration time (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Additional custom fields (flattened into token)
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Claims {
    /// Build access claims for a user.
    ///
    /// # Arguments
    /// * `subject` - User fields to snapshot
    /// * `issued_at` - Unix timestamp used for `iat` and `nbf`
    /// * `expires_at` - Unix timestamp used for `exp`
    ///
    /// # Returns
    /// Claims with a fresh `jti` and access-scoped issuer/audience
    pub fn for_subject(subject: &TokenSubject<'_>, issued_at: i64, expires_at: i64) -> Self {
        Self {
            user_id: subject.user_id.to_string(),
            email: subject.email.to_string(),
            role: subject.role.to_string(),
            permissions: subject.permissions.to_vec(),
            metadata: subject.metadata.clone(),
            jti: Some(Uuid::new_v4().to_string()),
            sub: Some(subject.user_id.to_string()),
            iss: Some(ACCESS_ISSUER.to_string()),
            aud: Some(ACCESS_AUDIENCE.into()),
            iat: Some(issued_at),
            nbf: Some(issued_at),
            exp: Some(expires_at),
            extra: HashMap::new(),
        }
    }

    /// Look up any claim by its wire name.
    ///
    /// Works uniformly for dedicated fields (`"role"`, `"exp"`) and custom
    /// keys stored in `extra`.
    pub fn claim(&self, key: &str) -> Option<Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut map)) => map.remove(key),
            _ => None,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp.map_or(false, |exp| exp < current_timestamp)
    }
}

impl RegisteredClaims for Claims {
    fn not_before(&self) -> Option<i64> {
        self.nbf
    }

    fn expires_at(&self) -> Option<i64> {
        self.exp
    }
}

/// Refresh token claims: subject plus registered fields only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshClaims {
    pub jti: String,
    pub sub: String,
    pub iss: String,
    pub aud: Audience,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

impl RefreshClaims {
    pub fn new(user_id: impl ToString, issued_at: i64, expires_at: i64) -> Self {
        Self {
            jti: Uuid::new_v4().to_string(),
            sub: user_id.to_string(),
            iss: REFRESH_SCOPE.to_string(),
            aud: REFRESH_SCOPE.into(),
            iat: issued_at,
            nbf: issued_at,
            exp: expires_at,
        }
    }
}

impl RegisteredClaims for RefreshClaims {
    fn not_before(&self) -> Option<i64> {
        Some(self.nbf)
    }

    fn expires_at(&self) -> Option<i64> {
        Some(self.exp)
    }
}

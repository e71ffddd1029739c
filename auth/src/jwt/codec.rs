use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use serde_json::json;
use serde_json::Map;
use serde_json::Value;
use uuid::Uuid;

use super::claims::Claims;
use super::claims::RefreshClaims;
use super::claims::TokenSubject;
use super::claims::ACCESS_AUDIENCE;
use super::claims::ACCESS_ISSUER;
use super::claims::REFRESH_SCOPE;
use super::errors::JwtError;
use super::handler::JwtHandler;
use crate::duration::duration_or;

/// Access token lifetime used when the configured value is unusable.
pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Refresh token lifetime used when the configured value is unusable.
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Issues and validates the three token classes (access, refresh, custom)
/// against one shared secret.
///
/// Tokens move from issued to valid (`nbf <= now <= exp`) to expired. There is
/// no revocation: a correctly signed, unexpired token of the right class is
/// always accepted.
#[derive(Clone)]
pub struct TokenCodec {
    handler: JwtHandler,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    /// Create a codec.
    ///
    /// TTL strings are parsed here; unparsable or sub-second values fall back to
    /// 24 hours (access) and 7 days (refresh) instead of failing.
    ///
    /// # Arguments
    /// * `secret` - HMAC signing secret
    /// * `access_ttl` - Access token lifetime, e.g. `"24h"`
    /// * `refresh_ttl` - Refresh token lifetime, e.g. `"7d"`
    ///
    /// # Errors
    /// * `MissingSecret` - The secret is empty
    pub fn new(secret: &[u8], access_ttl: &str, refresh_ttl: &str) -> Result<Self, JwtError> {
        Ok(Self {
            handler: JwtHandler::new(secret)?,
            access_ttl: duration_or(access_ttl, DEFAULT_ACCESS_TTL),
            refresh_ttl: duration_or(refresh_ttl, DEFAULT_REFRESH_TTL),
        })
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Sign an access token carrying a snapshot of `subject`.
    pub fn issue_access_token(&self, subject: &TokenSubject<'_>) -> Result<String, JwtError> {
        self.issue_access_token_at(subject, Utc::now())
    }

    pub fn issue_access_token_at(
        &self,
        subject: &TokenSubject<'_>,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let issued_at = now.timestamp();
        let claims = Claims::for_subject(subject, issued_at, expiry(issued_at, self.access_ttl)?);
        self.handler.encode(&claims)
    }

    /// Sign a refresh token for `user_id`.
    pub fn issue_refresh_token(&self, user_id: &str) -> Result<String, JwtError> {
        self.issue_refresh_token_at(user_id, Utc::now())
    }

    pub fn issue_refresh_token_at(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let issued_at = now.timestamp();
        let claims = RefreshClaims::new(user_id, issued_at, expiry(issued_at, self.refresh_ttl)?);
        self.handler.encode(&claims)
    }

    /// Sign a token from caller-supplied claims.
    ///
    /// The caller's map is merged over `jti`, `sub`, `user_id`, `iss`, `aud`,
    /// `iat`, `exp` and `nbf`. Caller keys win, including registered ones: a
    /// map carrying `"exp"` or `"aud"` replaces the computed value.
    pub fn issue_custom_token(
        &self,
        user_id: &str,
        custom_claims: Map<String, Value>,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        self.issue_custom_token_at(user_id, custom_claims, ttl, Utc::now())
    }

    pub fn issue_custom_token_at(
        &self,
        user_id: &str,
        custom_claims: Map<String, Value>,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let issued_at = now.timestamp();
        let mut claims = Map::new();
        claims.insert("jti".to_string(), json!(Uuid::new_v4().to_string()));
        claims.insert("sub".to_string(), json!(user_id));
        claims.insert("user_id".to_string(), json!(user_id));
        claims.insert("iss".to_string(), json!(ACCESS_ISSUER));
        claims.insert("aud".to_string(), json!(ACCESS_AUDIENCE));
        claims.insert("iat".to_string(), json!(issued_at));
        claims.insert("exp".to_string(), json!(expiry(issued_at, ttl)?));
        claims.insert("nbf".to_string(), json!(issued_at));

        claims.extend(custom_claims);

        self.handler.encode(&claims)
    }

    /// Validate an access (or custom) token.
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed, wrong algorithm, bad signature, refresh token, or not yet valid
    /// * `TokenExpired` - Otherwise valid but past `exp`
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        self.handler.decode(token, ACCESS_AUDIENCE, now.timestamp())
    }

    /// Validate a refresh token. Access tokens are rejected as invalid.
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, JwtError> {
        self.validate_refresh_token_at(token, Utc::now())
    }

    pub fn validate_refresh_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<RefreshClaims, JwtError> {
        self.handler.decode(token, REFRESH_SCOPE, now.timestamp())
    }
}

fn expiry(issued_at: i64, ttl: Duration) -> Result<i64, JwtError> {
    i64::try_from(ttl.as_secs())
        .ok()
        .and_then(|secs| issued_at.checked_add(secs))
        .ok_or_else(|| JwtError::EncodingFailed("token lifetime is too large".to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Duration as ChronoDuration;
    use chrono::TimeZone;

    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET, "1h", "7d").unwrap()
    }

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap()
    }

    fn issue_for_alice(codec: &TokenCodec, now: DateTime<Utc>) -> String {
        let permissions = vec!["read".to_string()];
        let metadata = HashMap::new();
        let subject = TokenSubject {
            user_id: "user-1",
            email: "alice@example.com",
            role: "user",
            permissions: &permissions,
            metadata: &metadata,
        };
        codec.issue_access_token_at(&subject, now).unwrap()
    }

    #[test]
    fn test_ttl_parsing_and_fallback() {
        let codec = TokenCodec::new(SECRET, "30m", "2d").unwrap();
        assert_eq!(codec.access_ttl(), Duration::from_secs(1_800));
        assert_eq!(codec.refresh_ttl(), Duration::from_secs(172_800));

        let codec = TokenCodec::new(SECRET, "forever", "").unwrap();
        assert_eq!(codec.access_ttl(), DEFAULT_ACCESS_TTL);
        assert_eq!(codec.refresh_ttl(), DEFAULT_REFRESH_TTL);
    }

    #[test]
    fn test_out_of_range_ttl_falls_back() {
        let codec = TokenCodec::new(SECRET, "999999999999999999999999h", "7d").unwrap();
        assert_eq!(codec.access_ttl(), DEFAULT_ACCESS_TTL);

        let huge = format!("{}d", "9".repeat(400));
        let codec = TokenCodec::new(SECRET, "1h", &huge).unwrap();
        assert_eq!(codec.refresh_ttl(), DEFAULT_REFRESH_TTL);
    }

    #[test]
    fn test_sub_second_ttl_falls_back() {
        let codec = TokenCodec::new(SECRET, "500ms", "900ms").unwrap();
        assert_eq!(codec.access_ttl(), DEFAULT_ACCESS_TTL);
        assert_eq!(codec.refresh_ttl(), DEFAULT_REFRESH_TTL);

        // A token issued now must outlive the second it was issued in
        let now = issued_at();
        let token = issue_for_alice(&codec, now);
        let claims = codec.validate_at(&token, now).unwrap();
        assert!(claims.exp.unwrap() > claims.iat.unwrap());
    }

    #[test]
    fn test_access_token_round_trip() {
        let codec = codec();
        let now = issued_at();
        let token = issue_for_alice(&codec, now);

        let claims = codec.validate_at(&token, now).unwrap();
        assert_eq!(claims.user_id, "user-1");
        assert_eq!(claims.sub.as_deref(), Some("user-1"));
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.permissions, vec!["read".to_string()]);
        assert_eq!(claims.iat, Some(now.timestamp()));
        assert_eq!(claims.nbf, Some(now.timestamp()));
        assert_eq!(claims.exp, Some(now.timestamp() + 3_600));
    }

    #[test]
    fn test_access_token_expires_after_ttl() {
        let codec = codec();
        let now = issued_at();
        let token = issue_for_alice(&codec, now);

        assert!(codec
            .validate_at(&token, now + ChronoDuration::seconds(3_600))
            .is_ok());
        assert_eq!(
            codec.validate_at(&token, now + ChronoDuration::seconds(3_601)),
            Err(JwtError::TokenExpired)
        );
    }

    #[test]
    fn test_tampered_signature_is_invalid() {
        let codec = codec();
        let now = issued_at();
        let token = issue_for_alice(&codec, now);

        let (unsigned, signature) = token.rsplit_once('.').unwrap();
        let mut bytes = signature.as_bytes().to_vec();
        bytes[0] = if bytes[0] == b'A' { b'B' } else { b'A' };
        let tampered = format!("{}.{}", unsigned, String::from_utf8(bytes).unwrap());

        assert!(matches!(
            codec.validate_at(&tampered, now),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_tokens_issued_in_same_second_differ() {
        let codec = codec();
        let now = issued_at();

        assert_ne!(issue_for_alice(&codec, now), issue_for_alice(&codec, now));
    }

    #[test]
    fn test_refresh_token_round_trip() {
        let codec = codec();
        let now = issued_at();
        let token = codec.issue_refresh_token_at("user-1", now).unwrap();

        let claims = codec.validate_refresh_token_at(&token, now).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.iss, REFRESH_SCOPE);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3_600);
    }

    #[test]
    fn test_token_classes_are_not_interchangeable() {
        let codec = codec();
        let now = issued_at();
        let access = issue_for_alice(&codec, now);
        let refresh = codec.issue_refresh_token_at("user-1", now).unwrap();

        assert!(matches!(
            codec.validate_at(&refresh, now),
            Err(JwtError::InvalidToken(_))
        ));
        assert!(matches!(
            codec.validate_refresh_token_at(&access, now),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_refresh_token_expires() {
        let codec = codec();
        let now = issued_at();
        let token = codec.issue_refresh_token_at("user-1", now).unwrap();

        assert_eq!(
            codec.validate_refresh_token_at(&token, now + ChronoDuration::days(8)),
            Err(JwtError::TokenExpired)
        );
    }

    #[test]
    fn test_custom_token_round_trip() {
        let codec = codec();
        let now = issued_at();
        let mut custom = Map::new();
        custom.insert("role".to_string(), json!("admin"));
        custom.insert("tenant".to_string(), json!("acme"));

        let token = codec
            .issue_custom_token_at("user-9", custom, Duration::from_secs(3_600), now)
            .unwrap();
        let claims = codec.validate_at(&token, now).unwrap();

        assert_eq!(claims.claim("role"), Some(json!("admin")));
        assert_eq!(claims.claim("tenant"), Some(json!("acme")));
        assert_eq!(claims.user_id, "user-9");
        assert_eq!(claims.sub.as_deref(), Some("user-9"));
        assert_eq!(claims.exp, Some(now.timestamp() + 3_600));
    }

    #[test]
    fn test_custom_claims_override_registered_fields() {
        let codec = codec();
        let now = issued_at();
        let mut custom = Map::new();
        custom.insert("exp".to_string(), json!(now.timestamp() - 10));

        let token = codec
            .issue_custom_token_at("user-9", custom, Duration::from_secs(3_600), now)
            .unwrap();

        assert_eq!(codec.validate_at(&token, now), Err(JwtError::TokenExpired));
    }

    #[test]
    fn test_not_yet_valid_token_is_invalid() {
        let codec = codec();
        let now = issued_at();
        let token = issue_for_alice(&codec, now);

        assert!(matches!(
            codec.validate_at(&token, now - ChronoDuration::seconds(5)),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_validate_with_real_clock() {
        let codec = codec();
        let token = issue_for_alice(&codec, Utc::now());

        assert_eq!(codec.validate(&token).unwrap().user_id, "user-1");
    }
}

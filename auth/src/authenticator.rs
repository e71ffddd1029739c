use std::time::Duration;

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::RefreshClaims;
use crate::jwt::TokenCodec;
use crate::jwt::TokenSubject;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token issuance.
///
/// Both halves are pure: nothing here touches user storage, so an
/// `Authenticator` can be shared freely across threads.
#[derive(Clone)]
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
}

/// Access and refresh token issued together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Always `"Bearer"`
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `password_hasher` - Hasher with an already validated cost
    /// * `token_codec` - Codec holding the signing secret and token lifetimes
    pub fn new(password_hasher: PasswordHasher, token_codec: TokenCodec) -> Self {
        Self {
            password_hasher,
            token_codec,
        }
    }

    pub fn token_codec(&self) -> &TokenCodec {
        &self.token_codec
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue a token pair.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `subject` - User fields to embed in the access token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match (or the hash is malformed)
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &TokenSubject<'_>,
    ) -> Result<TokenPair, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash) {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issue_tokens(subject)?)
    }

    /// Issue an access and a refresh token without password verification.
    ///
    /// Used by the refresh flow, where the caller has already proven
    /// possession of a valid refresh token.
    pub fn issue_tokens(&self, subject: &TokenSubject<'_>) -> Result<TokenPair, JwtError> {
        let expires_in = i64::try_from(self.token_codec.access_ttl().as_secs())
            .map_err(|_| JwtError::EncodingFailed("token lifetime is too large".to_string()))?;
        let access_token = self.token_codec.issue_access_token(subject)?;
        let refresh_token = self.token_codec.issue_refresh_token(subject.user_id)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
        })
    }

    /// Validate an access token.
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.token_codec.validate(token)
    }

    /// Validate a refresh token.
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, JwtError> {
        self.token_codec.validate_refresh_token(token)
    }

    /// Issue a token carrying caller-chosen claims.
    pub fn issue_custom_token(
        &self,
        user_id: &str,
        custom_claims: Map<String, Value>,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        self.token_codec.issue_custom_token(user_id, custom_claims, ttl)
    }
}

use jsonwebtoken::decode;
use jsonwebtoken::decode_header;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::claims::RegisteredClaims;
use super::errors::JwtError;

/// JWT token handler for encoding and decoding tokens.
///
/// Generic over the claims type. Signs with HS256 (HMAC with SHA-256) and
/// accepts nothing else on decode.
#[derive(Clone)]
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Errors
    /// * `MissingSecret` - The secret is empty
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::MissingSecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        })
    }

    /// Encode claims into a JWT token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a JWT token.
    ///
    /// Checks run in a fixed order:
    /// 1. the header names the configured HMAC algorithm
    /// 2. the signature verifies against the secret
    /// 3. the `aud` claim is present and names `audience`
    /// 4. `nbf <= now <= exp`
    ///
    /// # Arguments
    /// * `token` - JWT token string to decode
    /// * `audience` - Token class expected by the caller
    /// * `now` - Unix timestamp to check the validity window against
    ///
    /// # Errors
    /// * `InvalidToken` - Any of checks 1-3 failed, `exp` is missing, or `nbf` is in the future
    /// * `TokenExpired` - Checks 1-3 passed and `exp` is in the past
    pub fn decode<T>(&self, token: &str, audience: &str, now: i64) -> Result<T, JwtError>
    where
        T: DeserializeOwned + RegisteredClaims,
    {
        self.check_algorithm(token)?;

        // jsonwebtoken skips the audience check when `aud` is absent unless it is required
        let mut validation = Validation::new(self.algorithm);
        validation.set_required_spec_claims(&["aud"]);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.set_audience(&[audience]);

        let claims = decode::<T>(token, &self.decoding_key, &validation)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))?
            .claims;

        check_window(&claims, now)?;

        Ok(claims)
    }

    /// Reject any token whose header names an algorithm other than the
    /// configured one, before the signature is looked at.
    fn check_algorithm(&self, token: &str) -> Result<(), JwtError> {
        let header =
            decode_header(token).map_err(|e| JwtError::InvalidToken(format!("malformed header: {}", e)))?;

        match header.alg {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 if header.alg == self.algorithm => {
                Ok(())
            }
            other => Err(JwtError::InvalidToken(format!(
                "unexpected signing algorithm {:?}",
                other
            ))),
        }
    }
}

fn check_window<T: RegisteredClaims>(claims: &T, now: i64) -> Result<(), JwtError> {
    let exp = claims
        .expires_at()
        .ok_or_else(|| JwtError::InvalidToken("missing exp claim".to_string()))?;

    if let Some(nbf) = claims.not_before() {
        if now < nbf {
            return Err(JwtError::InvalidToken("token is not valid yet".to_string()));
        }
    }

    if now > exp {
        return Err(JwtError::TokenExpired);
    }

    Ok(())
}

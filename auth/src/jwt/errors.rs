use thiserror::Error;

/// Error type for JWT operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Signing secret must not be empty")]
    MissingSecret,

    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    /// Malformed token, wrong algorithm, bad signature, wrong token class,
    /// or a token that is not valid yet.
    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    /// Signature verified but the expiry has passed.
    #[error("Token is expired")]
    TokenExpired,
}

//! Credential primitives for the authkit services
//!
//! Provides the storage-agnostic half of authentication:
//! - Password hashing (bcrypt, configurable cost)
//! - Signed access, refresh and custom tokens (HS256 JWT)
//! - Role and permission checks over validated claims
//! - Authentication coordination
//!
//! User storage lives in the service crate; nothing here holds shared state.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::with_cost(4).unwrap();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! ```
//!
//! ## Tokens
//! ```
//! use std::collections::HashMap;
//!
//! use auth::{TokenCodec, TokenSubject};
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!", "24h", "7d").unwrap();
//! let permissions = vec!["read".to_string()];
//! let metadata = HashMap::new();
//! let subject = TokenSubject {
//!     user_id: "user123",
//!     email: "alice@example.com",
//!     role: "user",
//!     permissions: &permissions,
//!     metadata: &metadata,
//! };
//! let token = codec.issue_access_token(&subject).unwrap();
//! let claims = codec.validate(&token).unwrap();
//! assert_eq!(claims.email, "alice@example.com");
//! ```

pub mod access;
pub mod authenticator;
pub mod duration;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use access::AccessError;
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::TokenPair;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::RefreshClaims;
pub use jwt::TokenCodec;
pub use jwt::TokenSubject;
pub use password::PasswordError;
pub use password::PasswordHasher;

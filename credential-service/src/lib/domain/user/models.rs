use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use auth::TokenPair;
use auth::TokenSubject;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::user::errors::EmailError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UserIdError;

/// Role assigned at registration when the caller does not pick one
pub const DEFAULT_ROLE: &str = "user";

/// User aggregate entity.
///
/// The password hash never leaves the directory boundary: everything handed
/// back to callers goes through [`UserInfo`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub metadata: HashMap<String, Value>,
}

impl User {
    /// Borrow the fields embedded in an access token.
    ///
    /// `user_id` is the rendered form of `self.id`, owned by the caller.
    pub fn token_subject<'a>(&'a self, user_id: &'a str) -> TokenSubject<'a> {
        TokenSubject {
            user_id,
            email: self.email.as_str(),
            role: &self.role,
            permissions: &self.permissions,
            metadata: &self.metadata,
        }
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    ///
    /// # Returns
    /// UserId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Arguments
    /// * `s` - UUID string to parse
    ///
    /// # Returns
    /// Parsed UserId
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser. Comparison is
/// exact: `Alice@example.com` and `alice@example.com` are different users.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Arguments
    /// * `email` - Raw email string
    ///
    /// # Returns
    /// Validated EmailAddress value object
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Get email as string slice.
    ///
    /// # Returns
    /// Email string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password accepted for registration
///
/// Only enforces the length policy; the value is hashed by the service and
/// never stored.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    pub const MIN_LENGTH: usize = 8;

    /// Create a password that satisfies the registration policy.
    ///
    /// Length is counted in characters, not bytes.
    ///
    /// # Errors
    /// * `TooShort` - Fewer than 8 characters
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }
        Ok(Self(password))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(****)")
    }
}

/// User record handed to the directory for creation.
///
/// The directory assigns the identifier and both timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: EmailAddress,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub email_verified: bool,
    pub metadata: HashMap<String, Value>,
}

/// Command to register a new user with domain types
#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub email: EmailAddress,
    pub password: Password,
    pub name: String,
    pub role: Option<String>,
    pub metadata: HashMap<String, Value>,
}

impl RegisterCommand {
    /// Construct a new registration command.
    ///
    /// # Arguments
    /// * `email` - Validated email address
    /// * `password` - Policy-checked plaintext password (hashed by the service)
    /// * `name` - Display name
    ///
    /// # Returns
    /// RegisterCommand with the default role and no metadata
    pub fn new(email: EmailAddress, password: Password, name: String) -> Self {
        Self {
            email,
            password,
            name,
            role: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Command to update an existing user with optional fields.
///
/// All fields are optional to support partial updates.
/// Only provided fields will be updated; email and password are not updatable.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserCommand {
    pub name: Option<String>,
    pub role: Option<String>,
    pub permissions: Option<Vec<String>>,
    pub metadata: Option<HashMap<String, Value>>,
}

impl UpdateUserCommand {
    /// Apply the provided fields to `user` and stamp `updated_at`.
    pub fn apply(self, user: &mut User, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(permissions) = self.permissions {
            user.permissions = permissions;
        }
        if let Some(metadata) = self.metadata {
            user.metadata = metadata;
        }
        user.updated_at = now;
    }
}

/// Public view of a user: the record without its password hash
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub metadata: HashMap<String, Value>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.as_str().to_string(),
            name: user.name.clone(),
            role: user.role.clone(),
            permissions: user.permissions.clone(),
            email_verified: user.email_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
            metadata: user.metadata.clone(),
        }
    }
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

/// Result of a successful login or refresh
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: UserInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            email: EmailAddress::new("alice@example.com".to_string()).unwrap(),
            password_hash: "$2b$04$hash".to_string(),
            name: "Alice".to_string(),
            role: DEFAULT_ROLE.to_string(),
            permissions: vec![],
            email_verified: true,
            created_at: now,
            updated_at: now,
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn test_user_id_from_string() {
        let id = UserId::new();
        assert_eq!(UserId::from_string(&id.to_string()).unwrap(), id);
        assert!(UserId::from_string("not-a-uuid").is_err());
    }

    #[test]
    fn test_email_validation() {
        assert!(EmailAddress::new("alice@example.com".to_string()).is_ok());
        assert!(EmailAddress::new("not-an-email".to_string()).is_err());
    }

    #[test]
    fn test_password_policy() {
        assert!(Password::new("12345678".to_string()).is_ok());
        assert_eq!(
            Password::new("short".to_string()).unwrap_err(),
            PasswordPolicyError::TooShort { min: 8, actual: 5 }
        );
    }

    #[test]
    fn test_password_debug_is_redacted() {
        let password = Password::new("hunter2hunter2".to_string()).unwrap();
        assert!(!format!("{:?}", password).contains("hunter2"));
    }

    #[test]
    fn test_user_info_omits_password_hash() {
        let user = sample_user();
        let json = serde_json::to_value(UserInfo::from(&user)).unwrap();

        assert_eq!(json["email"], "alice@example.com");
        assert_eq!(json["id"], user.id.to_string());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_update_command_applies_only_provided_fields() {
        let mut user = sample_user();
        let before = user.updated_at;
        let later = before + chrono::Duration::seconds(5);

        UpdateUserCommand {
            role: Some("admin".to_string()),
            ..Default::default()
        }
        .apply(&mut user, later);

        assert_eq!(user.role, "admin");
        assert_eq!(user.name, "Alice");
        assert_eq!(user.updated_at, later);
        assert_eq!(user.created_at, before);
    }
}

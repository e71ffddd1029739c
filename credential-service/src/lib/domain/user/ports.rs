use std::time::Duration;

use async_trait::async_trait;
use auth::Claims;
use serde_json::Map;
use serde_json::Value;

use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::TokenResponse;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserInfo;
use crate::user::errors::UserError;

/// Port for credential service operations.
///
/// Everything returned here is a public view: password hashes never cross
/// this boundary.
#[async_trait]
pub trait CredentialServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// # Arguments
    /// * `command` - Validated email, policy-checked password, name, optional role and metadata
    ///
    /// # Returns
    /// Public view of the created user
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `Password` - Hashing failed
    async fn register(&self, command: RegisterCommand) -> Result<UserInfo, UserError>;

    /// Verify credentials and issue a token pair.
    ///
    /// # Arguments
    /// * `email` - Email as registered (exact match)
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// Access and refresh tokens plus the public user view
    ///
    /// # Errors
    /// * `NotFoundByEmail` - No user with this email
    /// * `InvalidPassword` - Password does not match
    async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, UserError>;

    /// Exchange a refresh token for a fresh token pair.
    ///
    /// The subject is re-read from the directory, so role and permission
    /// changes made since the last login are picked up here.
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed, tampered, wrong class or not yet valid
    /// * `TokenExpired` - Past its expiry
    /// * `NotFound` - The user was deleted
    async fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenResponse, UserError>;

    /// Validate an access token (bare, without the `Bearer ` prefix).
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed, tampered, wrong class or not yet valid
    /// * `TokenExpired` - Past its expiry
    fn validate_access_token(&self, token: &str) -> Result<Claims, UserError>;

    /// Issue a token carrying caller-chosen claims over the minimal access set.
    fn issue_custom_token(
        &self,
        user_id: &str,
        claims: Map<String, Value>,
        ttl: Duration,
    ) -> Result<String, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn get_user(&self, id: &UserId) -> Result<UserInfo, UserError>;

    /// Retrieve user by exact email.
    ///
    /// # Errors
    /// * `NotFoundByEmail` - No user with this email
    async fn get_user_by_email(&self, email: &str) -> Result<UserInfo, UserError>;

    /// Update name, role, permissions or metadata.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<UserInfo, UserError>;

    /// Delete a user. Deletion is immediate and cannot be undone.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn delete_user(&self, id: &UserId) -> Result<(), UserError>;

    /// List all users, in no particular order.
    async fn list_users(&self) -> Result<Vec<UserInfo>, UserError>;
}

/// Storage operations for the user aggregate.
///
/// Implementations must make every operation atomic with respect to the
/// others: a reader never observes a half-applied write, and the email
/// uniqueness check and the insert happen as one step.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// # Arguments
    /// * `user` - User fields; the directory assigns the ID and timestamps
    ///
    /// # Returns
    /// Stored user entity
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered (exact match)
    async fn create(&self, user: NewUser) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn find_by_id(&self, id: &UserId) -> Result<User, UserError>;

    /// Retrieve user by exact email.
    ///
    /// # Errors
    /// * `NotFoundByEmail` - No user with this email
    async fn find_by_email(&self, email: &str) -> Result<User, UserError>;

    /// Apply a partial update and stamp `updated_at`.
    ///
    /// # Returns
    /// Updated user entity
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn update(&self, id: &UserId, command: UpdateUserCommand) -> Result<User, UserError>;

    /// Remove user from storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    async fn delete(&self, id: &UserId) -> Result<(), UserError>;

    /// Snapshot of all users, unordered.
    async fn list(&self) -> Result<Vec<User>, UserError>;
}

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::Authenticator;
use auth::Claims;
use auth::PasswordHasher;
use auth::TokenCodec;
use serde_json::Map;
use serde_json::Value;

use crate::config::AuthConfig;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::TokenResponse;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserInfo;
use crate::domain::user::models::DEFAULT_ROLE;
use crate::user::errors::UserError;
use crate::user::ports::CredentialServicePort;
use crate::user::ports::UserDirectory;

/// Domain service implementation for credential operations.
///
/// Owns the directory handle and the hashing/signing configuration it was
/// built with. Tokens carry a snapshot of the user at issuance time; changes
/// made afterwards are only reflected once the token is refreshed.
pub struct CredentialService<D>
where
    D: UserDirectory,
{
    directory: Arc<D>,
    authenticator: Authenticator,
    require_email_verification: bool,
}

impl<D> CredentialService<D>
where
    D: UserDirectory,
{
    /// Create a new credential service with injected dependencies.
    ///
    /// # Arguments
    /// * `directory` - User storage implementation
    /// * `config` - Signing secret, token lifetimes and hashing cost
    ///
    /// # Returns
    /// Configured credential service instance
    ///
    /// # Errors
    /// * `Configuration` - Signing secret is empty
    /// * `Password` - Hash cost is outside the supported range
    pub fn new(directory: Arc<D>, config: &AuthConfig) -> Result<Self, UserError> {
        let password_hasher = PasswordHasher::with_cost(config.hash_cost)?;
        let token_codec = TokenCodec::new(
            config.signing_secret.as_bytes(),
            &config.access_token_ttl,
            &config.refresh_token_ttl,
        )?;

        tracing::info!(
            hash_cost = password_hasher.cost(),
            access_ttl_secs = token_codec.access_ttl().as_secs(),
            refresh_ttl_secs = token_codec.refresh_ttl().as_secs(),
            require_email_verification = config.require_email_verification,
            "Credential service configured"
        );

        Ok(Self {
            directory,
            authenticator: Authenticator::new(password_hasher, token_codec),
            require_email_verification: config.require_email_verification,
        })
    }

    pub fn token_codec(&self) -> &TokenCodec {
        self.authenticator.token_codec()
    }

    fn token_response(&self, user: &User) -> Result<TokenResponse, UserError> {
        let user_id = user.id.to_string();
        let tokens = self
            .authenticator
            .issue_tokens(&user.token_subject(&user_id))?;

        Ok(TokenResponse {
            tokens,
            user: user.into(),
        })
    }
}

#[async_trait]
impl<D> CredentialServicePort for CredentialService<D>
where
    D: UserDirectory,
{
    async fn register(&self, command: RegisterCommand) -> Result<UserInfo, UserError> {
        // Hash before touching the directory so no lock is held during bcrypt
        let password_hash = self.authenticator.hash_password(command.password.as_str())?;

        let new_user = NewUser {
            email: command.email,
            password_hash,
            name: command.name,
            role: command.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            permissions: Vec::new(),
            email_verified: !self.require_email_verification,
            metadata: command.metadata,
        };

        let user = self.directory.create(new_user).await.map_err(|e| {
            tracing::warn!("Registration failed: {}", e);
            e
        })?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");

        Ok(UserInfo::from(&user))
    }

    async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, UserError> {
        let user = self.directory.find_by_email(email).await.map_err(|e| {
            tracing::warn!("Login failed, unknown email: {}", email);
            e
        })?;

        let user_id = user.id.to_string();
        let tokens = self
            .authenticator
            .authenticate(password, &user.password_hash, &user.token_subject(&user_id))
            .map_err(|e| {
                tracing::warn!(user_id = %user.id, "Login failed: {}", e);
                UserError::from(e)
            })?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(TokenResponse {
            tokens,
            user: UserInfo::from(&user),
        })
    }

    async fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenResponse, UserError> {
        let claims = self
            .authenticator
            .validate_refresh_token(refresh_token)
            .map_err(|e| {
                tracing::warn!("Refresh token rejected: {}", e);
                UserError::from(e)
            })?;

        let user_id = UserId::from_string(&claims.sub)
            .map_err(|e| UserError::InvalidToken(format!("Malformed subject: {}", e)))?;

        let user = self.directory.find_by_id(&user_id).await.map_err(|e| {
            tracing::warn!(user_id = %user_id, "Refresh for missing user: {}", e);
            e
        })?;

        let response = self.token_response(&user)?;

        tracing::info!(user_id = %user.id, "Tokens refreshed");

        Ok(response)
    }

    fn validate_access_token(&self, token: &str) -> Result<Claims, UserError> {
        self.authenticator
            .validate_access_token(token)
            .map_err(UserError::from)
    }

    fn issue_custom_token(
        &self,
        user_id: &str,
        claims: Map<String, Value>,
        ttl: Duration,
    ) -> Result<String, UserError> {
        self.authenticator
            .issue_custom_token(user_id, claims, ttl)
            .map_err(UserError::from)
    }

    async fn get_user(&self, id: &UserId) -> Result<UserInfo, UserError> {
        self.directory
            .find_by_id(id)
            .await
            .map(|ref user| user.into())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<UserInfo, UserError> {
        self.directory
            .find_by_email(email)
            .await
            .map(|ref user| user.into())
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<UserInfo, UserError> {
        let user = self.directory.update(id, command).await?;

        tracing::info!(user_id = %user.id, "User updated");

        Ok(UserInfo::from(&user))
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.directory.delete(id).await?;

        tracing::info!(user_id = %id, "User deleted");

        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<UserInfo>, UserError> {
        let users = self.directory.list().await?;
        Ok(users.iter().map(UserInfo::from).collect())
    }
}

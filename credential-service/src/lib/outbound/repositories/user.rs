use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::user::models::NewUser;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserDirectory;
use crate::user::errors::UserError;

/// Both maps live behind one lock so the uniqueness check and the insert
/// cannot interleave with another writer.
#[derive(Debug, Default)]
struct Users {
    /// Map of user_id -> User
    by_id: HashMap<UserId, User>,
    /// Map of email -> user_id, exact match
    by_email: HashMap<String, UserId>,
}

/// Process-local user directory.
///
/// Cheap to clone; clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<Users>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if users.by_email.contains_key(user.email.as_str()) {
            return Err(UserError::EmailAlreadyExists(
                user.email.as_str().to_string(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            role: user.role,
            permissions: user.permissions,
            email_verified: user.email_verified,
            created_at: now,
            updated_at: now,
            metadata: user.metadata,
        };

        users
            .by_email
            .insert(user.email.as_str().to_string(), user.id);
        users.by_id.insert(user.id, user.clone());

        tracing::debug!("User stored: {} ({})", user.id, user.email);

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<User, UserError> {
        self.users
            .read()
            .await
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    async fn find_by_email(&self, email: &str) -> Result<User, UserError> {
        let users = self.users.read().await;

        users
            .by_email
            .get(email)
            .and_then(|id| users.by_id.get(id))
            .cloned()
            .ok_or_else(|| UserError::NotFoundByEmail(email.to_string()))
    }

    async fn update(&self, id: &UserId, command: UpdateUserCommand) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        let user = users
            .by_id
            .get_mut(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;

        command.apply(user, Utc::now());

        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let mut users = self.users.write().await;

        let user = users
            .by_id
            .remove(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        users.by_email.remove(user.email.as_str());

        tracing::debug!("User removed: {}", id);

        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, UserError> {
        Ok(self.users.read().await.by_id.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::models::EmailAddress;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: EmailAddress::new(email.to_string()).unwrap(),
            password_hash: "$2b$04$placeholder".to_string(),
            name: "Test".to_string(),
            role: "user".to_string(),
            permissions: vec![],
            email_verified: true,
            metadata: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamps() {
        let directory = InMemoryUserDirectory::new();

        let first = directory.create(new_user("a@example.com")).await.unwrap();
        let second = directory.create(new_user("b@example.com")).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.created_at, first.updated_at);
    }

    #[tokio::test]
    async fn test_create_duplicate_email_leaves_directory_unchanged() {
        let directory = InMemoryUserDirectory::new();
        let original = directory.create(new_user("a@example.com")).await.unwrap();

        let result = directory.create(new_user("a@example.com")).await;
        assert!(matches!(result, Err(UserError::EmailAlreadyExists(_))));

        let users = directory.list().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, original.id);
    }

    #[tokio::test]
    async fn test_email_match_is_exact() {
        let directory = InMemoryUserDirectory::new();
        directory.create(new_user("alice@example.com")).await.unwrap();

        assert!(directory.create(new_user("Alice@example.com")).await.is_ok());
        assert!(matches!(
            directory.find_by_email("ALICE@example.com").await,
            Err(UserError::NotFoundByEmail(_))
        ));
    }

    #[tokio::test]
    async fn test_find_by_email_and_id() {
        let directory = InMemoryUserDirectory::new();
        let created = directory.create(new_user("a@example.com")).await.unwrap();

        let by_email = directory.find_by_email("a@example.com").await.unwrap();
        let by_id = directory.find_by_id(&created.id).await.unwrap();
        assert_eq!(by_email.id, created.id);
        assert_eq!(by_id.email, created.email);

        assert!(matches!(
            directory.find_by_id(&UserId::new()).await,
            Err(UserError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_stamps_updated_at() {
        let directory = InMemoryUserDirectory::new();
        let created = directory.create(new_user("a@example.com")).await.unwrap();

        let command = UpdateUserCommand {
            name: Some("Renamed".to_string()),
            permissions: Some(vec!["write".to_string()]),
            ..Default::default()
        };
        let updated = directory.update(&created.id, command).await.unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.permissions, vec!["write".to_string()]);
        assert_eq!(updated.role, "user");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        let missing = directory
            .update(&UserId::new(), UpdateUserCommand::default())
            .await;
        assert!(matches!(missing, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_frees_email() {
        let directory = InMemoryUserDirectory::new();
        let created = directory.create(new_user("a@example.com")).await.unwrap();

        directory.delete(&created.id).await.unwrap();

        assert!(matches!(
            directory.delete(&created.id).await,
            Err(UserError::NotFound(_))
        ));
        assert!(matches!(
            directory.find_by_email("a@example.com").await,
            Err(UserError::NotFoundByEmail(_))
        ));
        assert!(directory.create(new_user("a@example.com")).await.is_ok());
    }
}

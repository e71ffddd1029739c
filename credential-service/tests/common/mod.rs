#![allow(dead_code)]

use std::sync::Arc;

use credential_service::config::AuthConfig;
use credential_service::domain::user::models::EmailAddress;
use credential_service::domain::user::models::Password;
use credential_service::domain::user::models::RegisterCommand;
use credential_service::domain::user::ports::CredentialServicePort;
use credential_service::domain::user::service::CredentialService;
use credential_service::inbound::http::router::create_router;
use credential_service::outbound::repositories::InMemoryUserDirectory;
use serde_json::json;

pub const TEST_SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Configuration used by every test app: fast hashing, default lifetimes
pub fn test_config() -> AuthConfig {
    AuthConfig {
        hash_cost: 4,
        ..AuthConfig::with_secret(TEST_SECRET)
    }
}

/// Credential service over a fresh in-memory directory
pub fn test_service(config: &AuthConfig) -> Arc<CredentialService<InMemoryUserDirectory>> {
    Arc::new(
        CredentialService::new(Arc::new(InMemoryUserDirectory::new()), config)
            .expect("Failed to build credential service"),
    )
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub service: Arc<CredentialService<InMemoryUserDirectory>>,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config()).await
    }

    pub async fn spawn_with(config: AuthConfig) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let service = test_service(&config);
        let router = create_router(Arc::clone(&service));

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            service,
            api_client: reqwest::Client::new(),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make PATCH request with Bearer token
    pub fn patch_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .patch(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Helper to make DELETE request with Bearer token
    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .delete(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Register through the API and return the response body
    pub async fn register(&self, email: &str, password: &str) -> serde_json::Value {
        self.post("/api/auth/register")
            .json(&json!({
                "email": email,
                "password": password,
                "name": "Test User"
            }))
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Failed to parse response")
    }

    /// Log in through the API and return the response body
    pub async fn login(&self, email: &str, password: &str) -> serde_json::Value {
        self.post("/api/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Failed to parse response")
    }

    /// Register an administrator directly through the service and return an access token
    pub async fn admin_token(&self) -> String {
        let command = RegisterCommand::new(
            EmailAddress::new("admin@example.com".to_string()).unwrap(),
            Password::new("admin-password".to_string()).unwrap(),
            "Admin".to_string(),
        )
        .with_role("admin");
        self.service
            .register(command)
            .await
            .expect("Failed to register admin");

        let body = self.login("admin@example.com", "admin-password").await;
        body["data"]["access_token"]
            .as_str()
            .expect("Missing access token")
            .to_string()
    }
}

use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::UserInfo;
use crate::domain::user::ports::CredentialServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<ApiSuccess<UserInfo>, ApiError> {
    state
        .credential_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|user| ApiSuccess::new(StatusCode::CREATED, user))
}

/// HTTP request body for registration (raw JSON)
///
/// Roles are not accepted here; self-registered users always get the
/// default role and an administrator promotes them afterwards.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegisterRequest {
    email: String,
    password: String,
    name: String,
    #[serde(default)]
    metadata: HashMap<String, Value>,
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterCommand, UserError> {
        let email = EmailAddress::new(self.email)?;
        let password = Password::new(self.password)?;
        Ok(RegisterCommand::new(email, password, self.name).with_metadata(self.metadata))
    }
}

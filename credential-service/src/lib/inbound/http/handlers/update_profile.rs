use std::collections::HashMap;

use auth::Claims;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserInfo;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::router::AppState;
use crate::user::ports::CredentialServicePort;

/// HTTP request body for a user editing their own profile
///
/// Only `name` and `metadata` are self-service. Anything else, `role` and
/// `permissions` included, is rejected with 422.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub metadata: Option<HashMap<String, Value>>,
}

impl From<UpdateProfileRequest> for UpdateUserCommand {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            name: req.name,
            metadata: req.metadata,
            ..Default::default()
        }
    }
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<ApiSuccess<UserInfo>, ApiError> {
    let user_id = UserId::from_string(&claims.user_id)
        .map_err(|_| ApiError::Unauthorized("Invalid token".to_string()))?;

    state
        .credential_service
        .update_user(&user_id, req.into())
        .await
        .map_err(ApiError::from)
        .map(|user| {
            tracing::info!(user_id = %user.id, "Profile updated");
            ApiSuccess::new(StatusCode::OK, user)
        })
}

use auth::Claims;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserInfo;
use crate::domain::user::ports::CredentialServicePort;
use crate::inbound::http::router::AppState;

/// Current user, as resolved from the access token's subject.
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<ApiSuccess<UserInfo>, ApiError> {
    let user_id = UserId::from_string(&claims.user_id)
        .map_err(|_| ApiError::Unauthorized("Invalid token".to_string()))?;

    state
        .credential_service
        .get_user(&user_id)
        .await
        .map_err(ApiError::from)
        .map(|user| ApiSuccess::new(StatusCode::OK, user))
}

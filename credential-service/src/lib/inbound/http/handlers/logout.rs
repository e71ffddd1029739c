use auth::Claims;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use crate::inbound::http::handlers::ApiSuccess;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Acknowledge a logout.
///
/// Tokens are not revoked: the client drops them, and they stay valid until
/// they expire.
pub async fn logout(Extension(claims): Extension<Claims>) -> ApiSuccess<LogoutResponse> {
    tracing::info!(user_id = %claims.user_id, "User logged out");

    ApiSuccess::new(
        StatusCode::OK,
        LogoutResponse {
            message: "Logged out".to_string(),
        },
    )
}

use auth::access;
use auth::Claims;
use axum::extract::Request;
use axum::extract::State;
use axum::http;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::user::ports::CredentialServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Role required by the user-management routes
pub const ADMIN_ROLE: &str = "admin";

/// Middleware that validates the bearer token and adds its claims to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(&req)?;

    let claims = state
        .credential_service
        .validate_access_token(token)
        .map_err(|e| {
            tracing::warn!("Access token rejected: {}", e);
            ApiError::from(e)
        })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Roles accepted by [`require_roles`]
#[derive(Debug, Clone, Copy)]
pub struct RequiredRoles(pub &'static [&'static str]);

/// Permission demanded by [`require_permission`]
#[derive(Debug, Clone, Copy)]
pub struct RequiredPermission(pub &'static str);

/// Middleware that lets a request through when its claims carry one of the
/// configured roles.
///
/// Must run after [`authenticate`]; a request without claims is treated as
/// unauthenticated. Attach with
/// `middleware::from_fn_with_state(RequiredRoles(&["admin"]), require_roles)`.
pub async fn require_roles(
    State(RequiredRoles(roles)): State<RequiredRoles>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    access::require_any_role(req.extensions().get::<Claims>(), roles).map_err(|e| {
        tracing::warn!("Access denied: {}", e);
        ApiError::from(e)
    })?;

    Ok(next.run(req).await)
}

/// Middleware that lets a request through when its claims carry the
/// configured permission. Must run after [`authenticate`].
pub async fn require_permission(
    State(RequiredPermission(permission)): State<RequiredPermission>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    access::require_permission(req.extensions().get::<Claims>(), permission).map_err(|e| {
        tracing::warn!("Access denied: {}", e);
        ApiError::from(e)
    })?;

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header".to_string()))?;

    auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::Unauthorized(
            "Invalid Authorization header format. Expected: Bearer <token>".to_string(),
        )
    })
}

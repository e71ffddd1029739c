//! Role and permission checks over validated access claims.

use thiserror::Error;

use crate::jwt::Claims;

/// Authorization failures, distinct from token failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Insufficient role: requires one of {0:?}")]
    InsufficientRole(Vec<String>),

    #[error("Insufficient permissions: requires {0}")]
    InsufficientPermission(String),
}

/// Require the caller to hold exactly `role`.
///
/// # Errors
/// * `Unauthorized` - No claims (request was not authenticated)
/// * `InsufficientRole` - Claims carry another role
pub fn require_role(claims: Option<&Claims>, role: &str) -> Result<(), AccessError> {
    require_any_role(claims, &[role])
}

/// Require the caller to hold one of `roles`.
pub fn require_any_role(claims: Option<&Claims>, roles: &[&str]) -> Result<(), AccessError> {
    let claims = claims.ok_or(AccessError::Unauthorized)?;

    if roles.iter().any(|role| claims.has_role(role)) {
        Ok(())
    } else {
        Err(AccessError::InsufficientRole(
            roles.iter().map(|role| role.to_string()).collect(),
        ))
    }
}

/// Require `permission` to be in the caller's permission set.
pub fn require_permission(claims: Option<&Claims>, permission: &str) -> Result<(), AccessError> {
    let claims = claims.ok_or(AccessError::Unauthorized)?;

    if claims.has_permission(permission) {
        Ok(())
    } else {
        Err(AccessError::InsufficientPermission(permission.to_string()))
    }
}

use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Hash cost {cost} is outside the supported range {min}..={max}")]
    WeakParameter { cost: u32, min: u32, max: u32 },

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}

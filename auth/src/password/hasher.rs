use super::errors::PasswordError;

/// Lowest bcrypt work factor accepted.
pub const MIN_COST: u32 = 4;

/// Highest bcrypt work factor accepted.
pub const MAX_COST: u32 = 31;

/// Work factor used when the caller does not choose one.
pub const DEFAULT_COST: u32 = ::bcrypt::DEFAULT_COST;

/// Password hashing implementation.
///
/// Produces self-describing bcrypt strings (`$2b$<cost>$<salt><digest>`) with a
/// fresh random salt per call. The cost is validated once, at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Create a password hasher with the default work factor.
    ///
    /// # Returns
    /// PasswordHasher using cost 12
    pub fn new() -> Self {
        Self { cost: DEFAULT_COST }
    }

    /// Create a password hasher with an explicit work factor.
    ///
    /// # Arguments
    /// * `cost` - bcrypt cost, between 4 and 31 inclusive
    ///
    /// # Errors
    /// * `WeakParameter` - Cost is outside the supported range (never clamped)
    pub fn with_cost(cost: u32) -> Result<Self, PasswordError> {
        check_cost(cost)?;
        Ok(Self { cost })
    }

    /// Configured work factor.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// bcrypt hash string (includes version, cost and salt)
    ///
    /// # Errors
    /// * `HashingFailed` - The underlying bcrypt operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        ::bcrypt::hash(password, self.cost).map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// Malformed hashes and wrong passwords both yield `false`; the cause is
    /// never reported to the caller.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        verify_password(password, hash)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash a password without a configured hasher.
///
/// # Arguments
/// * `password` - Plaintext password
/// * `cost` - Work factor; `None` selects the default of 12
///
/// # Errors
/// * `WeakParameter` - Explicit cost is outside the supported range
/// * `HashingFailed` - The underlying bcrypt operation failed
pub fn hash_password(password: &str, cost: Option<u32>) -> Result<String, PasswordError> {
    PasswordHasher::with_cost(cost.unwrap_or(DEFAULT_COST))?.hash(password)
}

/// Compare a plaintext password with a bcrypt hash in constant time.
pub fn verify_password(password: &str, hash: &str) -> bool {
    ::bcrypt::verify(password, hash).unwrap_or(false)
}

fn check_cost(cost: u32) -> Result<(), PasswordError> {
    if (MIN_COST..=MAX_COST).contains(&cost) {
        Ok(())
    } else {
        Err(PasswordError::WeakParameter {
            cost,
            min: MIN_COST,
            max: MAX_COST,
        })
    }
}

pub mod errors;
pub mod hasher;

pub use errors::PasswordError;
pub use hasher::hash_password;
pub use hasher::verify_password;
pub use hasher::PasswordHasher;

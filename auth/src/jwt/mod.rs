pub mod claims;
pub mod codec;
pub mod errors;
pub mod handler;

pub use claims::Audience;
pub use claims::Claims;
pub use claims::RefreshClaims;
pub use claims::TokenSubject;
pub use codec::TokenCodec;
pub use errors::JwtError;
pub use handler::JwtHandler;

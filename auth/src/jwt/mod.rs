pub mod claims;
pub mod codec;
pub mod errors;
pub mod handler;
pub mod token_type;

pub use claims::Claims;
pub use codec::SignedToken;
pub use codec::TokenCodec;
pub use errors::JwtError;
pub use handler::JwtHandler;
pub use token_type::TokenType;

use thiserror::Error;

use super::token_type::TokenType;

/// Error type for JWT operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Token type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: TokenType,
        actual: TokenType,
    },

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Unknown token type: {0}")]
    UnknownTokenType(String),
}

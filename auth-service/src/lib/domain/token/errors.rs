use auth::JwtError;
use thiserror::Error;

/// Errors raised while issuing, resolving or revoking tokens.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    /// Signature, expiry, type or subject check failed
    #[error("Unauthenticated: {0}")]
    Unauthenticated(JwtError),

    /// Token is valid but no longer stored (consumed, rotated or revoked)
    #[error("Token not found")]
    NotFound,

    #[error("Failed to sign token: {0}")]
    Signing(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

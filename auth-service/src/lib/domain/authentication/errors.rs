use thiserror::Error;

use crate::domain::token::errors::TokenError;
use crate::domain::user::errors::UserError;

/// Closed set of failure kinds surfaced by the authentication flows.
///
/// Every variant carries a client-safe message; infrastructure detail is
/// logged where the error is converted and never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("{0}")]
    ValidationFailed(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unavailable(String),
}

impl AuthError {
    pub fn unauthorized(message: &str) -> Self {
        AuthError::Unauthorized(message.to_string())
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, AuthError::Unavailable(_))
    }
}

const UNAVAILABLE: &str = "Internal server error";

impl From<UserError> for AuthError {
    fn from(error: UserError) -> Self {
        match error {
            UserError::InvalidUserId(_)
            | UserError::InvalidName(_)
            | UserError::InvalidEmail(_)
            | UserError::InvalidPassword(_)
            | UserError::InvalidRole(_) => AuthError::ValidationFailed(error.to_string()),
            UserError::NotFound(_) | UserError::NotFoundByEmail(_) => {
                AuthError::NotFound("User not found".to_string())
            }
            UserError::EmailAlreadyExists(_) => {
                AuthError::Conflict("Email already taken".to_string())
            }
            UserError::Hashing(cause) | UserError::DatabaseError(cause) => {
                tracing::error!(error = %cause, "User directory failure");
                AuthError::Unavailable(UNAVAILABLE.to_string())
            }
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(error: TokenError) -> Self {
        match error {
            TokenError::Unauthenticated(_) | TokenError::NotFound => {
                AuthError::unauthorized("Please authenticate")
            }
            TokenError::Signing(cause) | TokenError::DatabaseError(cause) => {
                tracing::error!(error = %cause, "Token store failure");
                AuthError::Unavailable(UNAVAILABLE.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use auth::JwtError;

    use super::*;
    use crate::domain::user::errors::PasswordPolicyError;

    #[test]
    fn test_user_error_mapping() {
        assert_eq!(
            AuthError::from(UserError::EmailAlreadyExists("a@x.com".to_string())),
            AuthError::Conflict("Email already taken".to_string())
        );
        assert!(matches!(
            AuthError::from(UserError::from(PasswordPolicyError::MissingLetterOrDigit)),
            AuthError::ValidationFailed(_)
        ));
        assert!(matches!(
            AuthError::from(UserError::NotFound("id".to_string())),
            AuthError::NotFound(_)
        ));
    }

    #[test]
    fn test_infrastructure_detail_is_hidden() {
        let error = AuthError::from(UserError::DatabaseError(
            "relation \"users\" does not exist".to_string(),
        ));
        assert_eq!(error, AuthError::Unavailable(UNAVAILABLE.to_string()));
        assert!(!error.to_string().contains("relation"));
    }

    #[test]
    fn test_token_error_mapping() {
        assert_eq!(
            AuthError::from(TokenError::Unauthenticated(JwtError::Expired)),
            AuthError::unauthorized("Please authenticate")
        );
        assert_eq!(
            AuthError::from(TokenError::NotFound),
            AuthError::unauthorized("Please authenticate")
        );
        assert!(AuthError::from(TokenError::DatabaseError("timeout".to_string())).is_unavailable());
    }
}

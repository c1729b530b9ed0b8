use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use uuid::Uuid;

pub use auth::TokenType;

use crate::domain::user::models::UserId;

/// Stored refresh or purpose token.
///
/// At most one row exists per (`user_id`, `token_type`); issuing a new token
/// of the same type replaces the previous row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub id: Uuid,
    pub token: String,
    pub user_id: UserId,
    pub token_type: TokenType,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Token {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Lifetimes of each token type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSettings {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub reset_password_ttl: Duration,
    pub verify_email_ttl: Duration,
}

impl TokenSettings {
    pub fn ttl(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
            TokenType::ResetPassword => self.reset_password_ttl,
            TokenType::VerifyEmail => self.verify_email_ttl,
        }
    }
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            access_ttl: Duration::minutes(30),
            refresh_ttl: Duration::days(30),
            reset_password_ttl: Duration::minutes(10),
            verify_email_ttl: Duration::minutes(10),
        }
    }
}

/// A token handed to a client together with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires: DateTime<Utc>,
}

impl From<auth::SignedToken> for IssuedToken {
    fn from(signed: auth::SignedToken) -> Self {
        Self {
            token: signed.token,
            expires: signed.expires_at,
        }
    }
}

/// Access and refresh token pair returned after a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthTokens {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

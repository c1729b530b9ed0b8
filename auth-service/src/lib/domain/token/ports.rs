use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::token::errors::TokenError;
use crate::domain::token::models::AuthTokens;
use crate::domain::token::models::Token;
use crate::domain::token::models::TokenType;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

/// Port for the token lifecycle: issuance, resolution, consumption and
/// revocation.
#[async_trait]
pub trait TokenServicePort: Send + Sync + 'static {
    /// Mint an access token (not stored) and a refresh token (stored,
    /// replacing the user's previous refresh token).
    ///
    /// # Errors
    /// * `Signing` - Token could not be signed
    /// * `DatabaseError` - Refresh token could not be stored
    async fn generate_auth_tokens(&self, user: &User) -> Result<AuthTokens, TokenError>;

    /// Mint and store a reset-password token, replacing any previous one.
    async fn generate_reset_password_token(&self, user: &User) -> Result<String, TokenError>;

    /// Mint and store a verify-email token, replacing any previous one.
    async fn generate_verify_email_token(&self, user: &User) -> Result<String, TokenError>;

    /// Decode `raw` as a `token_type` token and return its stored row.
    ///
    /// # Errors
    /// * `Unauthenticated` - Signature, expiry or type check failed
    /// * `NotFound` - Token is valid but was consumed or superseded
    /// * `DatabaseError` - Lookup failed
    async fn find_token(&self, raw: &str, token_type: TokenType) -> Result<Token, TokenError>;

    /// Like [`find_token`](Self::find_token) but deletes the row in the same
    /// store operation, so only one caller can ever consume a given token.
    async fn consume_token(&self, raw: &str, token_type: TokenType)
        -> Result<Token, TokenError>;

    /// Remove the user's token of `token_type`. Succeeds when none exists.
    async fn delete_token(&self, token_type: TokenType, user_id: &UserId)
        -> Result<(), TokenError>;

    /// Check a stateless access token and return its subject.
    ///
    /// # Errors
    /// * `Unauthenticated` - Signature, expiry, type or subject check failed
    async fn verify_access_token(&self, raw: &str) -> Result<UserId, TokenError>;

    /// Delete every stored token whose expiry has passed.
    async fn purge_expired(&self) -> Result<u64, TokenError>;
}

/// Persistence operations for stored tokens.
#[async_trait]
pub trait TokenRepository: Send + Sync + 'static {
    /// Insert `token`, replacing any row with the same user and type.
    async fn save(&self, token: Token) -> Result<Token, TokenError>;

    /// Look up the row matching user, raw value and type.
    async fn find_by_user_and_value(
        &self,
        user_id: &UserId,
        value: &str,
        token_type: TokenType,
    ) -> Result<Option<Token>, TokenError>;

    /// Atomically delete and return the row matching user, raw value and type.
    ///
    /// Of two concurrent calls for the same row at most one gets `Some`.
    async fn take_by_user_and_value(
        &self,
        user_id: &UserId,
        value: &str,
        token_type: TokenType,
    ) -> Result<Option<Token>, TokenError>;

    /// Delete the user's row of `token_type`, returning the number removed.
    async fn delete_by_user(
        &self,
        user_id: &UserId,
        token_type: TokenType,
    ) -> Result<u64, TokenError>;

    /// Delete rows with `expires_at <= now`, returning the number removed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, TokenError>;
}

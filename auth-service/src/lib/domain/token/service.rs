use std::sync::Arc;

use async_trait::async_trait;
use auth::JwtError;
use auth::TokenCodec;
use uuid::Uuid;

use crate::domain::token::errors::TokenError;
use crate::domain::token::models::AuthTokens;
use crate::domain::token::models::IssuedToken;
use crate::domain::token::models::Token;
use crate::domain::token::models::TokenSettings;
use crate::domain::token::models::TokenType;
use crate::domain::token::ports::TokenRepository;
use crate::domain::token::ports::TokenServicePort;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;

/// Token lifecycle service.
///
/// Signing and verification go through the codec; stored tokens go through
/// the repository. The service itself keeps no state between calls.
pub struct TokenService<TR>
where
    TR: TokenRepository,
{
    repository: Arc<TR>,
    codec: Arc<TokenCodec>,
    settings: TokenSettings,
}

impl<TR> TokenService<TR>
where
    TR: TokenRepository,
{
    pub fn new(repository: Arc<TR>, codec: Arc<TokenCodec>, settings: TokenSettings) -> Self {
        Self {
            repository,
            codec,
            settings,
        }
    }

    /// Sign a token for `user_id` and store it when its type is persisted.
    async fn issue(&self, user_id: &UserId, token_type: TokenType) -> Result<IssuedToken, TokenError> {
        let signed = self
            .codec
            .sign(&user_id.to_string(), token_type, self.settings.ttl(token_type))
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        if token_type.is_persisted() {
            self.repository
                .save(Token {
                    id: Uuid::new_v4(),
                    token: signed.token.clone(),
                    user_id: *user_id,
                    token_type,
                    expires_at: signed.expires_at,
                    created_at: self.codec.now(),
                })
                .await?;
        }

        Ok(signed.into())
    }

    /// Verify `raw` cryptographically and recover its subject.
    fn decode(&self, raw: &str, token_type: TokenType) -> Result<UserId, TokenError> {
        let claims = self.codec.verify(raw, token_type).map_err(|e| {
            tracing::debug!(token_type = %token_type, error = %e, "Token rejected");
            TokenError::Unauthenticated(e)
        })?;

        UserId::from_string(&claims.sub).map_err(|e| {
            tracing::warn!(token_type = %token_type, error = %e, "Token subject is not a user id");
            TokenError::Unauthenticated(JwtError::Malformed(e.to_string()))
        })
    }

    /// Reject rows whose stored expiry has passed even if the claim did not.
    fn ensure_live(&self, token: Token) -> Result<Token, TokenError> {
        if token.is_expired(self.codec.now()) {
            return Err(TokenError::Unauthenticated(JwtError::Expired));
        }
        Ok(token)
    }
}

#[async_trait]
impl<TR> TokenServicePort for TokenService<TR>
where
    TR: TokenRepository,
{
    async fn generate_auth_tokens(&self, user: &User) -> Result<AuthTokens, TokenError> {
        let access = self.issue(&user.id, TokenType::Access).await?;
        let refresh = self.issue(&user.id, TokenType::Refresh).await?;

        tracing::debug!(user_id = %user.id, "Auth tokens issued");

        Ok(AuthTokens { access, refresh })
    }

    async fn generate_reset_password_token(&self, user: &User) -> Result<String, TokenError> {
        let issued = self.issue(&user.id, TokenType::ResetPassword).await?;
        Ok(issued.token)
    }

    async fn generate_verify_email_token(&self, user: &User) -> Result<String, TokenError> {
        let issued = self.issue(&user.id, TokenType::VerifyEmail).await?;
        Ok(issued.token)
    }

    async fn find_token(&self, raw: &str, token_type: TokenType) -> Result<Token, TokenError> {
        let user_id = self.decode(raw, token_type)?;

        let token = self
            .repository
            .find_by_user_and_value(&user_id, raw, token_type)
            .await?
            .ok_or(TokenError::NotFound)?;

        self.ensure_live(token)
    }

    async fn consume_token(
        &self,
        raw: &str,
        token_type: TokenType,
    ) -> Result<Token, TokenError> {
        let user_id = self.decode(raw, token_type)?;

        let token = self
            .repository
            .take_by_user_and_value(&user_id, raw, token_type)
            .await?
            .ok_or_else(|| {
                tracing::debug!(user_id = %user_id, token_type = %token_type, "Token already consumed or superseded");
                TokenError::NotFound
            })?;

        tracing::debug!(user_id = %user_id, token_type = %token_type, "Token consumed");

        self.ensure_live(token)
    }

    async fn delete_token(
        &self,
        token_type: TokenType,
        user_id: &UserId,
    ) -> Result<(), TokenError> {
        let removed = self.repository.delete_by_user(user_id, token_type).await?;
        tracing::debug!(user_id = %user_id, token_type = %token_type, removed, "Token deleted");

        Ok(())
    }

    async fn verify_access_token(&self, raw: &str) -> Result<UserId, TokenError> {
        self.decode(raw, TokenType::Access)
    }

    async fn purge_expired(&self) -> Result<u64, TokenError> {
        let removed = self.repository.delete_expired(self.codec.now()).await?;
        if removed > 0 {
            tracing::info!(removed, "Expired tokens purged");
        }

        Ok(removed)
    }
}

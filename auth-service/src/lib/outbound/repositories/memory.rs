//! In-memory repositories for tests and local runs without Postgres.
//!
//! Each operation takes the lock once, which gives the same per-call
//! atomicity as the single SQL statements of the Postgres adapters.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::token::errors::TokenError;
use crate::domain::token::models::Token;
use crate::domain::token::models::TokenType;
use crate::domain::token::ports::TokenRepository;
use crate::domain::user::errors::UserError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserChanges;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;

/// User store. When linked to a token store, deleting a user also drops its
/// tokens, like the `ON DELETE CASCADE` of the `tokens` table.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
    tokens: Option<Arc<InMemoryTokenRepository>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: Arc<InMemoryTokenRepository>) -> Self {
        Self {
            users: RwLock::default(),
            tokens: Some(tokens),
        }
    }
}

fn email_taken(users: &HashMap<UserId, User>, email: &EmailAddress, except: &UserId) -> bool {
    users
        .values()
        .any(|existing| existing.email == *email && existing.id != *except)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if email_taken(&users, &user.email, &user.id) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email == *email).cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn update(&self, id: &UserId, changes: UserChanges) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if let Some(email) = &changes.email {
            if email_taken(&users, email, id) {
                return Err(UserError::EmailAlreadyExists(email.to_string()));
            }
        }

        let user = users
            .get_mut(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        changes.apply_to(user);

        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        self.users
            .write()
            .await
            .remove(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;

        if let Some(tokens) = &self.tokens {
            tokens.remove_user(id).await;
        }

        Ok(())
    }
}

/// Token rows keyed by (user, type), mirroring the unique constraint of the
/// `tokens` table.
#[derive(Default)]
pub struct InMemoryTokenRepository {
    tokens: RwLock<HashMap<(UserId, TokenType), Token>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }

    async fn remove_user(&self, user_id: &UserId) {
        self.tokens
            .write()
            .await
            .retain(|(owner, _), _| owner != user_id);
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn save(&self, token: Token) -> Result<Token, TokenError> {
        self.tokens
            .write()
            .await
            .insert((token.user_id, token.token_type), token.clone());
        Ok(token)
    }

    async fn find_by_user_and_value(
        &self,
        user_id: &UserId,
        value: &str,
        token_type: TokenType,
    ) -> Result<Option<Token>, TokenError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .get(&(*user_id, token_type))
            .filter(|token| token.token == value)
            .cloned())
    }

    async fn take_by_user_and_value(
        &self,
        user_id: &UserId,
        value: &str,
        token_type: TokenType,
    ) -> Result<Option<Token>, TokenError> {
        let mut tokens = self.tokens.write().await;
        let key = (*user_id, token_type);

        match tokens.get(&key) {
            Some(token) if token.token == value => Ok(tokens.remove(&key)),
            _ => Ok(None),
        }
    }

    async fn delete_by_user(
        &self,
        user_id: &UserId,
        token_type: TokenType,
    ) -> Result<u64, TokenError> {
        let removed = self.tokens.write().await.remove(&(*user_id, token_type));
        Ok(u64::from(removed.is_some()))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, TokenError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, token| token.expires_at > now);
        Ok((before - tokens.len()) as u64)
    }
}

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;

use crate::domain::token::errors::TokenError;
use crate::domain::token::models::Token;
use crate::domain::token::models::TokenType;
use crate::domain::token::ports::TokenRepository;
use crate::domain::user::models::UserId;

pub struct PostgresTokenRepository {
    pool: PgPool,
}

impl PostgresTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn database_error(e: sqlx::Error) -> TokenError {
    TokenError::DatabaseError(e.to_string())
}

fn token_from_row(row: &PgRow) -> Result<Token, TokenError> {
    let token_type: String = row.try_get("token_type").map_err(database_error)?;

    Ok(Token {
        id: row.try_get("id").map_err(database_error)?,
        token: row.try_get("token").map_err(database_error)?,
        user_id: UserId(row.try_get("user_id").map_err(database_error)?),
        token_type: token_type
            .parse()
            .map_err(|e: auth::JwtError| TokenError::DatabaseError(e.to_string()))?,
        expires_at: row.try_get("expires_at").map_err(database_error)?,
        created_at: row.try_get("created_at").map_err(database_error)?,
    })
}

#[async_trait]
impl TokenRepository for PostgresTokenRepository {
    async fn save(&self, token: Token) -> Result<Token, TokenError> {
        let row = sqlx::query(
            r#"
            INSERT INTO tokens (id, token, user_id, token_type, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, token_type) DO UPDATE
            SET id = EXCLUDED.id,
                token = EXCLUDED.token,
                expires_at = EXCLUDED.expires_at,
                created_at = EXCLUDED.created_at
            RETURNING id, token, user_id, token_type, expires_at, created_at
            "#,
        )
        .bind(token.id)
        .bind(&token.token)
        .bind(token.user_id.0)
        .bind(token.token_type.as_str())
        .bind(token.expires_at)
        .bind(token.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(database_error)?;

        token_from_row(&row)
    }

    async fn find_by_user_and_value(
        &self,
        user_id: &UserId,
        value: &str,
        token_type: TokenType,
    ) -> Result<Option<Token>, TokenError> {
        let row = sqlx::query(
            r#"
            SELECT id, token, user_id, token_type, expires_at, created_at
            FROM tokens
            WHERE user_id = $1 AND token = $2 AND token_type = $3
            "#,
        )
        .bind(user_id.0)
        .bind(value)
        .bind(token_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.as_ref().map(token_from_row).transpose()
    }

    async fn take_by_user_and_value(
        &self,
        user_id: &UserId,
        value: &str,
        token_type: TokenType,
    ) -> Result<Option<Token>, TokenError> {
        // A single statement: concurrent callers race on the row lock and
        // only one of them sees it returned.
        let row = sqlx::query(
            r#"
            DELETE FROM tokens
            WHERE user_id = $1 AND token = $2 AND token_type = $3
            RETURNING id, token, user_id, token_type, expires_at, created_at
            "#,
        )
        .bind(user_id.0)
        .bind(value)
        .bind(token_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.as_ref().map(token_from_row).transpose()
    }

    async fn delete_by_user(
        &self,
        user_id: &UserId,
        token_type: TokenType,
    ) -> Result<u64, TokenError> {
        let result = sqlx::query("DELETE FROM tokens WHERE user_id = $1 AND token_type = $2")
            .bind(user_id.0)
            .bind(token_type.as_str())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, TokenError> {
        let result = sqlx::query("DELETE FROM tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected())
    }
}

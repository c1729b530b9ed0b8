use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Postgres;
use sqlx::QueryBuilder;
use sqlx::Row;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserChanges;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserName;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, verified_email, created_at, updated_at";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn database_error(e: sqlx::Error) -> UserError {
    UserError::DatabaseError(e.to_string())
}

/// Map a write failure, turning the email unique constraint into a conflict.
fn write_error(e: sqlx::Error, email: &EmailAddress) -> UserError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some("users_email_key") {
            return UserError::EmailAlreadyExists(email.as_str().to_string());
        }
    }
    database_error(e)
}

fn user_from_row(row: &PgRow) -> Result<User, UserError> {
    let role: String = row.try_get("role").map_err(database_error)?;

    Ok(User {
        id: UserId(row.try_get("id").map_err(database_error)?),
        name: UserName::new(row.try_get("name").map_err(database_error)?)?,
        email: EmailAddress::new(row.try_get("email").map_err(database_error)?)?,
        password_hash: row.try_get("password_hash").map_err(database_error)?,
        role: role.parse()?,
        verified_email: row.try_get("verified_email").map_err(database_error)?,
        created_at: row.try_get("created_at").map_err(database_error)?,
        updated_at: row.try_get("updated_at").map_err(database_error)?,
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, verified_email, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id.0)
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.verified_email)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, &user.email))?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        rows.iter().map(user_from_row).collect()
    }

    async fn update(&self, id: &UserId, changes: UserChanges) -> Result<User, UserError> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE users SET updated_at = ");
        query.push_bind(changes.updated_at);

        if let Some(name) = &changes.name {
            query.push(", name = ").push_bind(name.as_str().to_string());
        }
        if let Some(email) = &changes.email {
            query.push(", email = ").push_bind(email.as_str().to_string());
        }
        if let Some(password_hash) = &changes.password_hash {
            query.push(", password_hash = ").push_bind(password_hash.clone());
        }
        if let Some(role) = changes.role {
            query.push(", role = ").push_bind(role.as_str());
        }
        if let Some(verified_email) = changes.verified_email {
            query.push(", verified_email = ").push_bind(verified_email);
        }

        query.push(" WHERE id = ").push_bind(id.0);
        query.push(format!(" RETURNING {USER_COLUMNS}"));

        let row = query
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| match &changes.email {
                Some(email) => write_error(e, email),
                None => database_error(e),
            })?;

        match row {
            Some(row) => user_from_row(&row),
            None => Err(UserError::NotFound(id.to_string())),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        Ok(())
    }
}

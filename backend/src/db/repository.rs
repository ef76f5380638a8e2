use sqlx::mysql::MySqlPool;

use super::models::{NewUser, User};
use crate::error::{Result, ServiceError};

const USER_COLUMNS: &str =
    "id, created_at, updated_at, deleted_at, name, email, password_hash";

#[derive(Clone)]
pub struct UserRepository {
    pool: MySqlPool,
}

impl UserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, user: &NewUser) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users (created_at, updated_at, name, email, password_hash) \
             VALUES (NOW(3), NOW(3), ?, ?, ?)",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                ServiceError::DuplicateAccount
            }
            other => ServiceError::Database(other),
        })?;

        let id = result.last_insert_id();
        self.find_by_id(id).await?.ok_or_else(|| {
            ServiceError::Internal(format!("User {} vanished after insert", id))
        })
    }

    pub async fn find_by_id(&self, id: u64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = ? AND deleted_at IS NULL",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn list(&self, limit: u32) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE deleted_at IS NULL ORDER BY id LIMIT ?",
            USER_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}

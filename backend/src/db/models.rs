use chrono::NaiveDateTime;
use serde::Serialize;

use super::schema::{ColumnDef, EntityDescriptor, IndexDef};
use crate::error::Result;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: u64,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<NaiveDateTime>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl User {
    pub const TABLE: &'static str = "users";

    pub const DESCRIPTOR: EntityDescriptor = EntityDescriptor {
        table: Self::TABLE,
        columns: &[
            ColumnDef::new("id", "BIGINT UNSIGNED NOT NULL AUTO_INCREMENT"),
            ColumnDef::new("created_at", "DATETIME(3) NULL"),
            ColumnDef::new("updated_at", "DATETIME(3) NULL"),
            ColumnDef::new("deleted_at", "DATETIME(3) NULL"),
            ColumnDef::new("name", "VARCHAR(255) NOT NULL"),
            // 191 chars keeps a unique utf8mb4 index under the InnoDB key limit.
            ColumnDef::new("email", "VARCHAR(191) NOT NULL"),
            ColumnDef::new("password_hash", "VARCHAR(255) NOT NULL"),
        ],
        primary_key: "id",
        indexes: &[
            IndexDef::new("idx_users_deleted_at", &["deleted_at"], false),
            IndexDef::new("idx_users_email", &["email"], true),
        ],
    };
}

/// A user that has not been written yet; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn new(name: String, email: String, password: &str) -> Result<Self> {
        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;

        Ok(Self {
            name,
            email,
            password_hash,
        })
    }
}

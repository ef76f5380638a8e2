use async_trait::async_trait;
use serde::Deserialize;

use crate::db::{NewUser, Store, User};
use crate::error::{Result, ServiceError};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SignUpRequest {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ServiceError::InvalidSignUp("name is required".to_string()));
        }
        if !self.email.contains('@') {
            return Err(ServiceError::InvalidSignUp(
                "email must be a valid address".to_string(),
            ));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ServiceError::InvalidSignUp(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

/// Creates accounts for `/signup`. The store is passed in by the caller so
/// implementations hold no connection of their own.
#[async_trait]
pub trait AccountRegistrar: Send + Sync {
    async fn register(&self, store: &Store, request: SignUpRequest) -> Result<User>;
}

/// Validates the request, hashes the password and inserts into `users`.
/// Concurrent signups for one email are settled by the unique index on
/// `users.email`.
#[derive(Debug, Clone, Default)]
pub struct SqlAccountRegistrar;

impl SqlAccountRegistrar {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AccountRegistrar for SqlAccountRegistrar {
    async fn register(&self, store: &Store, request: SignUpRequest) -> Result<User> {
        request.validate()?;

        let SignUpRequest {
            name,
            email,
            password,
        } = request;
        let new_user = NewUser::new(name.trim().to_string(), email, &password)?;

        store.users().insert(&new_user).await
    }
}

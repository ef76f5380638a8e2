#![allow(dead_code)]

use async_trait::async_trait;
use backend::accounts::{AccountRegistrar, SignUpRequest};
use backend::config::{SharedSecret, StoreConfig};
use backend::db::{Store, User};
use backend::error::Result;
use backend::graphql::build_schema;
use backend::middleware::AuthGate;
use backend::routes::AppState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const SECRET: &str = "YourSecretValue";

pub fn store_config() -> StoreConfig {
    StoreConfig {
        host: "127.0.0.1".to_string(),
        port: "3306".to_string(),
        name: "backend_test".to_string(),
        user: "tester".to_string(),
        password: "not-used".to_string(),
    }
}

/// Records every call instead of touching the database.
#[derive(Default)]
pub struct CountingRegistrar {
    calls: AtomicUsize,
    store_targets: Mutex<Vec<String>>,
}

impl CountingRegistrar {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn store_targets(&self) -> Vec<String> {
        self.store_targets.lock().unwrap().clone()
    }
}

#[async_trait]
impl AccountRegistrar for CountingRegistrar {
    async fn register(&self, store: &Store, request: SignUpRequest) -> Result<User> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.store_targets
            .lock()
            .unwrap()
            .push(store.target().to_string());

        Ok(User {
            id: 42,
            created_at: None,
            updated_at: None,
            deleted_at: None,
            name: request.name,
            email: request.email,
            password_hash: String::new(),
        })
    }
}

/// Must be called from inside the test runtime; the pool never connects.
pub fn app_state(registrar: Arc<CountingRegistrar>) -> AppState {
    let store = Store::connect_lazy(&store_config()).unwrap();
    AppState::new(
        store.clone(),
        build_schema(store),
        AuthGate::new(SharedSecret::new(SECRET).unwrap()),
        registrar,
    )
}

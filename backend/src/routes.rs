use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

use crate::{
    accounts::AccountRegistrar,
    db::Store,
    graphql::AppSchema,
    handlers,
    middleware::{signup_gate, AuthGate},
};

pub const SIGNUP_PATH: &str = "/signup";

/// Shared state handed to every worker. Cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub schema: AppSchema,
    pub gate: AuthGate,
    pub registrar: Arc<dyn AccountRegistrar>,
}

impl AppState {
    pub fn new(
        store: Store,
        schema: AppSchema,
        gate: AuthGate,
        registrar: Arc<dyn AccountRegistrar>,
    ) -> Self {
        Self {
            store,
            schema,
            gate,
            registrar,
        }
    }
}

/// Registers the shared state and the route table:
///
/// | Method | Path        | Gate |
/// |--------|-------------|------|
/// | GET    | `/`         | no   |
/// | POST   | `/query`    | no   |
/// | GET    | `/graphiql` | no   |
/// | POST   | `/signup`   | yes  |
///
/// The gate wraps the whole `/signup` scope, so every method sent to that
/// path is checked before anything else runs.
pub fn mount(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(state.store))
            .app_data(web::Data::new(state.schema))
            .app_data(web::Data::new(state.gate))
            .app_data(web::Data::from(state.registrar))
            // Open routes
            .service(handlers::index)
            .service(handlers::graphql_query)
            .service(handlers::graphiql)
            // Gated routes
            .service(
                web::scope(SIGNUP_PATH)
                    .wrap(from_fn(signup_gate))
                    .route("", web::post().to(handlers::signup)),
            );
    }
}

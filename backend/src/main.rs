use actix_web::{middleware as actix_middleware, App, HttpServer};
use std::sync::Arc;

use backend::accounts::{AccountRegistrar, SqlAccountRegistrar};
use backend::config::{AppConfig, MigrationPolicy, LISTEN_ADDR};
use backend::db::{self, User};
use backend::graphql;
use backend::middleware::AuthGate;
use backend::routes::{self, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if it exists (for development)
    // Try loading from current directory first, then from backend/ directory
    if dotenvy::dotenv().is_err() {
        dotenvy::from_filename("backend/.env").ok();
    }

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    log::info!("Starting backend...");

    // Load configuration
    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!(
            "Hint: DB_CONFIG must hold a JSON object with DB_HOST, DB_PORT, DB_NAME, \
             DB_USER and DB_PASSWORD, and SIGNUP_SECRET must be set"
        );
        std::process::exit(1);
    });
    log::info!(
        "Loaded configuration (schema migration policy: {:?})",
        config.migration_policy
    );

    // Connect to MySQL, one attempt only
    let store = db::connect(&config.store).await.unwrap_or_else(|e| {
        log::error!("{}", e);
        std::process::exit(1);
    });

    // Bring the schema up to date before serving anything
    log::info!("Ensuring database schema...");
    match db::ensure_schema(&store, &[&User::DESCRIPTOR]).await {
        Ok(report) if report.is_unchanged() => log::info!("Database schema is up to date"),
        Ok(report) => log::info!(
            "Database schema updated: created tables {:?}, added columns {:?}, added indexes {:?}",
            report.created_tables,
            report.added_columns,
            report.added_indexes
        ),
        Err(e) => match config.migration_policy {
            MigrationPolicy::Fatal => {
                log::error!("{}", e);
                std::process::exit(1);
            }
            MigrationPolicy::LogOnly => {
                log::error!("{}. Continuing startup.", e);
            }
        },
    }

    let registrar: Arc<dyn AccountRegistrar> = Arc::new(SqlAccountRegistrar::new());
    let state = AppState::new(
        store.clone(),
        graphql::build_schema(store),
        AuthGate::new(config.signup_secret),
        registrar,
    );

    let (host, port) = LISTEN_ADDR;
    log::info!("Starting HTTP server at {}:{}...", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            // Middleware
            .wrap(actix_middleware::Logger::default())
            .wrap(actix_middleware::Compress::default())
            // Shared state and routes
            .configure(routes::mount(state.clone()))
    })
    .bind(LISTEN_ADDR)?
    .run()
    .await
}

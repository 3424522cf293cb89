use rusty_library::{
    adapters::memory::InMemoryLibrary,
    adapters::postgres::{
        PostgresBookRepository, PostgresLoanLedger, PostgresMemberRepository,
        PostgresStatsReader,
    },
    api::{create_router, handlers::AppState},
    application::ServiceDependencies,
    config::AppConfig,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_library=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    let service_deps = match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await
                .expect("Failed to connect to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("Failed to run migrations");

            tracing::info!(
                max_connections = config.database_max_connections,
                "using PostgreSQL store"
            );

            ServiceDependencies {
                books: Arc::new(PostgresBookRepository::new(pool.clone())),
                members: Arc::new(PostgresMemberRepository::new(pool.clone())),
                loans: Arc::new(PostgresLoanLedger::new(pool.clone())),
                stats: Arc::new(PostgresStatsReader::new(pool)),
            }
        }
        None => {
            tracing::warn!("DATABASE_URL is not set, using in-memory store");
            ServiceDependencies::from_store(Arc::new(InMemoryLibrary::new()))
        }
    };

    let app_state = Arc::new(AppState { service_deps });
    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}

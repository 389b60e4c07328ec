//! LocaLibrary Server - Library Locator System
//!
//! REST API server connecting readers to the libraries around them.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use localibrary_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("localibrary_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LocaLibrary Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services; a missing or weak signing key aborts
    // startup here instead of serving with a broken token codec.
    let repository = Repository::new(pool);
    let services = Services::new(repository, &config).expect("Invalid authentication configuration");

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/register", post(api::auth::register))
        .route("/auth/me", get(api::auth::me))
        // Libraries (public + owner management)
        .route("/libraries", get(api::libraries::list_libraries))
        .route("/libraries/:id", get(api::libraries::get_library))
        .route("/libraries/:id", put(api::libraries::update_library))
        .route("/libraries/:id/manage", get(api::libraries::get_my_library))
        .route("/libraries/:id/books", get(api::libraries::list_holdings))
        .route("/libraries/:id/books", post(api::libraries::add_book))
        .route(
            "/libraries/:id/books/:book_id",
            put(api::libraries::update_copies),
        )
        .route(
            "/libraries/:id/books/:book_id",
            delete(api::libraries::remove_book),
        )
        .route(
            "/libraries/:id/books/:book_id/details",
            put(api::libraries::update_book_details),
        )
        // Books (public catalog)
        .route("/books", get(api::books::search_books))
        .route("/books/popular", get(api::books::popular_books))
        .route("/books/:id", get(api::books::get_book))
        .route("/books/:id/libraries", get(api::books::libraries_for_book))
        .route("/genres", get(api::books::list_genres))
        // Admin (staff)
        .route("/admin/dashboard", get(api::admin::dashboard))
        .route("/admin/libraries", get(api::admin::list_libraries))
        .route(
            "/admin/libraries/:id/status",
            put(api::admin::update_library_status),
        )
        .route("/admin/libraries/:id", delete(api::admin::delete_library))
        .route("/admin/moderators", post(api::admin::create_moderator))
        .route("/admin/moderators", get(api::admin::list_moderators))
        .route(
            "/admin/moderators/:id/status",
            patch(api::admin::update_moderator_status),
        )
        .route(
            "/admin/moderators/:id",
            delete(api::admin::delete_moderator),
        )
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

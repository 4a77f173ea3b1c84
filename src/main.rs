use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use costkatana_templates::api::{self, AppState};
use costkatana_templates::config::AppConfig;
use costkatana_templates::domain::template::Estimator;
use costkatana_templates::domain::usage::UsageLog;
use costkatana_templates::domain::workspace::Workspace;
use costkatana_templates::infrastructure::repositories::HttpTemplateRepository;
use costkatana_templates::infrastructure::storage::SqliteKeyValueStore;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = AppConfig::from_env().expect("Invalid configuration");

    // Template service client
    let repository = HttpTemplateRepository::new(
        config.template_service_url.clone(),
        config.template_service_token.clone(),
    )
    .expect("Failed to create template service client");
    tracing::info!("Using template service at {}", config.template_service_url);

    // Usage history store
    tracing::info!("Opening usage store...");
    let store = SqliteKeyValueStore::connect(&config.usage_store_url)
        .await
        .expect("Failed to open usage store");
    let usage_log = Arc::new(UsageLog::new(Arc::new(store)));

    let mut workspace = Workspace::new(
        Arc::new(repository),
        usage_log,
        Estimator::new(config.cost_per_token),
    );
    let count = workspace.fetch_templates().await;
    tracing::info!("Loaded {} templates", count);

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = api::router(AppState::new(workspace))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Server listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .await
        .expect("Server failed");
}

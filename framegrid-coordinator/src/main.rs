use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod queue;
pub mod storage;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "framegrid_coordinator=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Framegrid Coordinator...");

    // Base directory holds project artifacts; renders/ is created beneath it
    let base_dir = std::env::var("FRAMEGRID_BASE_DIR").unwrap_or_else(|_| ".".to_string());

    let storage = storage::Storage::open(&base_dir).expect("Failed to open render storage");

    tracing::info!("Render storage ready under {}", base_dir);

    // Build router with all API endpoints
    let app = api::create_router(api::AppState::new(storage));

    // Get bind address
    let addr =
        std::env::var("COORDINATOR_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}

//! Reference FAQ service
//!
//! Answers chat turns from a JSON FAQ file using keyword overlap.

use faq_chat::server::{create_router, AppState, FaqIndex};
use faq_chat::ServerConfig;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "faq_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let faq = FaqIndex::load(&config.faq_path)?;
    if faq.is_empty() {
        tracing::warn!(path = %config.faq_path.display(), "FAQ file has no entries");
    } else {
        tracing::info!(path = %config.faq_path.display(), entries = faq.len(), "Loaded FAQ");
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState::new(faq, config.max_context, config.max_sessions);
    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(
        addr = %config.bind,
        max_context = config.max_context,
        max_sessions = config.max_sessions,
        "FAQ service listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}

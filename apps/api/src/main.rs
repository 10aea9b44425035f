mod analysis;
mod augmentation;
mod config;
mod errors;
mod extraction;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::terms::TermExtractor;
use crate::analysis::vocabulary::Vocabulary;
use crate::augmentation::ollama::OllamaClient;
use crate::augmentation::{Augmenter, OllamaAugmenter};
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS API v{}", env!("CARGO_PKG_VERSION"));

    // Load and compile the vocabulary; a bad table fails startup
    let vocabulary = Arc::new(Vocabulary::load(config.vocabulary_path.as_deref())?);
    let term_extractor = Arc::new(TermExtractor::new(vocabulary)?);
    info!(
        "Vocabulary {} loaded ({} entries)",
        term_extractor.vocabulary().version(),
        term_extractor.vocabulary().entries().len()
    );

    // Initialize the generative backend, if enabled
    let augmenter: Option<Arc<dyn Augmenter>> = if config.ollama_enabled {
        let client = OllamaClient::new(
            &config.ollama_base_url,
            &config.ollama_model,
            config.augmentation_timeout,
        );
        info!(
            "Augmentation enabled ({} at {})",
            client.model(),
            config.ollama_base_url
        );
        Some(Arc::new(OllamaAugmenter::new(client)))
    } else {
        info!("Augmentation disabled");
        None
    };

    let state = AppState {
        config: config.clone(),
        term_extractor,
        augmenter,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

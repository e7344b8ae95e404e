//! Recall Memory Server
//!
//! HTTP API for the session memory store.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recall_memory::{
    config::EmbedderKind, http::create_router, Config, Embedder, OpenAiEmbedder,
    SessionMemoryStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let embedder = build_embedder(&config)?;
    tracing::info!(
        model = embedder.model_name(),
        dimensions = embedder.dimensions(),
        "Embedding port ready"
    );

    let store = Arc::new(SessionMemoryStore::from_config(&config, embedder)?);
    let app = create_router(store);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_embedder(config: &Config) -> anyhow::Result<Arc<dyn Embedder>> {
    match config.embedder {
        EmbedderKind::OpenAi => {
            if config.embedding_api_key.is_none() {
                tracing::warn!("OPENAI_API_KEY is not set; embedding requests will be unauthenticated");
            }
            Ok(Arc::new(OpenAiEmbedder::from_config(config)?))
        }
        #[cfg(feature = "local-embeddings")]
        EmbedderKind::Local => Ok(Arc::new(recall_memory::FastEmbedder::new()?)),
        #[cfg(not(feature = "local-embeddings"))]
        EmbedderKind::Local => {
            anyhow::bail!("RECALL_EMBEDDER=local requires building with --features local-embeddings")
        }
    }
}

use mnemo::{
    AppState, Config,
    api::routes::create_router,
    extract::LlmProfileExtractor,
    llm::LLMClient,
    store::StoreProvider,
    turn::TurnProcessor,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    // Process-wide collaborators, built once and shared by every turn
    let provider = config.llm_provider()?;
    tracing::info!(provider = provider.name(), model = provider.model(), "creating LLM client");
    let llm: Arc<dyn LLMClient> = Arc::from(provider.create_client().await?);

    let store_provider = StoreProvider::from_env();
    tracing::info!(store = store_provider.name(), "connecting store");
    let (memory, threads) = store_provider.create_store().await?;

    let extractor = Arc::new(LlmProfileExtractor::new(llm.clone()));
    let processor = Arc::new(TurnProcessor::new(
        llm,
        memory.clone(),
        threads,
        extractor,
    ));

    let state = AppState {
        config: config.clone(),
        processor,
        memory,
    };

    let app = axum::Router::new()
        .nest("/api", create_router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("mnemo-server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

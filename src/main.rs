use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leitner::{
    config::Config,
    repositories::store::LeitnerStore,
    routes,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    match config.database_url.clone() {
        Some(database_url) => {
            let state = AppState::connect(&config, &database_url).await?;
            serve(state).await
        }
        None => {
            tracing::warn!("⚠️ DATABASE_URL is not set, decks will only live in memory");
            serve(AppState::in_memory(&config)).await
        }
    }
}

async fn serve<S: LeitnerStore>(state: AppState<S>) -> anyhow::Result<()> {
    let addr = state.config.bind_addr;
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

use rental_finder::{
    api::{create_router, AppState},
    config::Config,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rental_finder=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    let address = config.bind_address();

    // A missing or malformed listings table is fatal
    let state = AppState::from_config(config)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}

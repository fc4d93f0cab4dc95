use parlor::{AppState, Config, app};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("parlor=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    let addr = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(config);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "chat relay listening");
    axum::serve(listener, app(state)).await?;

    Ok(())
}

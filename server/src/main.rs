use std::sync::Arc;

use server::{build_app, config::Config, AppState};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!(
        port = config.port,
        model = %config.gemini_model,
        upstream = %config.gemini_base_url,
        "tonefix proxy starting"
    );
    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; correction and tone requests will fail with 500");
    }
    if let Some(dir) = &config.static_dir {
        info!(path = %dir, "serving static page assets from");
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let state = Arc::new(AppState::new(config)?);
    let app = build_app(state);

    info!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

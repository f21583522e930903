use anyhow::Result;
use parlo::llm::GeminiGateway;
use parlo::server::ApiServer;
use parlo::session::{SessionConfig, SessionController};
use parlo::transcript::TranscriptStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parlo=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Parlo language tutor backend");

    let config = SessionConfig::from_env();
    config.validate()?;

    if !config.llm.is_connected() {
        warn!("no API key configured; /chat will fail until GEMINI_API_KEY is set");
    }

    let store = TranscriptStore::open(&config.data_dir)?;
    info!(
        turns = store.len(),
        data_dir = %config.data_dir.display(),
        "transcript loaded"
    );

    let gateway = Arc::new(GeminiGateway::new(config.llm.clone()));
    let port = config.port;
    let controller = Arc::new(SessionController::new(config, store, gateway));

    // Cooldown ticker: purely local, 1-second granularity
    let ticker_controller = Arc::clone(&controller);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        loop {
            interval.tick().await;
            ticker_controller.tick(Instant::now());
        }
    });

    let mut server = ApiServer::new(port);
    server.start(controller);

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    server.stop();

    Ok(())
}

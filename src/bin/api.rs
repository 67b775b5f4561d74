use currency_news_agent::{api::start_server, AgentConfig, Orchestrator, Shell};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    // Missing keys stop the process here, never at request time
    let config = AgentConfig::from_env().map_err(|e| {
        error!("{}", e);
        eprintln!("Set GOOGLE_API_KEY and TAVILY_API_KEY in the environment or .env");
        e
    })?;

    info!("💱 Currency Converter & News - web shell");
    info!("📍 Port: {}", config.port);

    let orchestrator = Arc::new(Orchestrator::initialize(&config)?);
    let shell = Arc::new(Shell::new(orchestrator, config.request_timeout));

    info!("✅ Orchestrator initialized");

    start_server(shell, config.port).await?;

    Ok(())
}

use currency_news_agent::{AgentConfig, ConversionRequest, CurrencyCode, Orchestrator};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Run one conversion from the command line: `fx-agent USD EUR`
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let mut args = std::env::args().skip(1);
    let from: CurrencyCode = args.next().as_deref().unwrap_or("USD").parse()?;
    let to: CurrencyCode = args.next().as_deref().unwrap_or("EUR").parse()?;
    let request = ConversionRequest::new(from, to);

    let config = AgentConfig::from_env()?;
    let orchestrator = Orchestrator::initialize(&config)?;

    info!(task = %request.task(), "Running agent");

    match orchestrator.run(&request).await {
        Ok(run) => {
            info!(
                rounds = run.iterations,
                elapsed_ms = run.elapsed_ms,
                "Conversion successful"
            );
            for (i, step) in run.trace.iter().enumerate() {
                info!("  {}: {}", i + 1, step);
            }
            println!("{}", run.output);
            Ok(())
        }
        Err(e) => {
            eprintln!("Conversion failed: {}", e);
            Err(Box::new(e) as Box<dyn std::error::Error>)
        }
    }
}

use clap::{Parser, Subcommand};
use content_pulse::analyze::ContentAnalyzer;
use content_pulse::config::Config;
use content_pulse::store::sample_table;
use serde_json::{json, Value};
use std::error::Error;
use tracing::info;

#[derive(Parser)]
#[command(name = "content-pulse", version, about = "Content performance analytics backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print build information
    Info,
    /// Analyze a generated sample dataset and print the report
    Analyze {
        /// Days of sample data to generate
        #[arg(long, default_value_t = 30)]
        days: usize,
        /// Seed for the sample generator
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Run the HTTP API server
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Info => {
            let info = json!({
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Command::Analyze { days, seed } => {
            info!("Generating sample data days={}", days);
            let table = sample_table(days, seed);
            let outcome = ContentAnalyzer::new().analyze(&Value::Array(table.to_records()));
            println!("{}", outcome.to_json(true)?);
        }
        Command::Serve => {
            let config = Config::from_env();
            info!("Starting content-pulse on {}", config.bind_addr());
            content_pulse::api::serve(config).await?;
        }
    }

    Ok(())
}

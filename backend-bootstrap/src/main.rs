use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "ticketgate")]
#[command(about = "Ticket issuance and gate check-in server", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if args.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    if let Some(config) = args.config {
        std::env::set_var(backend_infrastructure::CONFIG_PATH_ENV, config);
    }

    backend_bootstrap::run().await
}

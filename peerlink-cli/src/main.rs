use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "peerlink", about = "WebRTC signaling relay for local networks")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Run the peerlink signaling server
    Serve(commands::serve::ServeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = config::ConfigLoader::load()?;

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&loaded.config.logging.level))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
    loaded.log();

    let config = loaded.config;
    match cli.command {
        Commands::Config(args) => commands::config::run(args, config),
        Commands::Serve(args) => commands::serve::run(args, config).await,
    }
}

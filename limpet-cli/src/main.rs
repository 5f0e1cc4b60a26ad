//! Limpet CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use limpet_cache::SweeperConfig;
use limpet_files::FileServer;
use limpet_runtime::{Server, SignalHandler};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "limpet")]
#[command(about = "Caching, compressing static file server", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve a directory
    Serve {
        /// Directory to serve files from
        #[arg(short, long, env = "LIMPET_ROOT", default_value = ".")]
        root: PathBuf,

        /// Route prefix stripped from request paths
        #[arg(long, env = "LIMPET_ROUTE", default_value = "")]
        route: String,

        /// Listen address
        #[arg(short, long, env = "LIMPET_LISTEN", default_value = "127.0.0.1:8080")]
        listen: SocketAddr,

        /// Disable the in-memory response cache
        #[arg(long)]
        no_cache: bool,

        /// Per-entry cache ceiling in bytes
        #[arg(long, default_value_t = limpet_files::DEFAULT_MAX_BYTES_PER_ENTRY)]
        max_bytes: usize,

        /// Seconds between eviction sweeps
        #[arg(long, default_value_t = 60)]
        sweep_interval: u64,

        /// Seconds a cached entry may live before eviction
        #[arg(long, default_value_t = 600)]
        max_entry_age: u64,

        /// Log level (trace, debug, info, warn, error)
        #[arg(long, env = "LIMPET_LOG", default_value = "info")]
        log_level: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            root,
            route,
            listen,
            no_cache,
            max_bytes,
            sweep_interval,
            max_entry_age,
            log_level,
        } => {
            init_tracing(&log_level)?;

            let files = FileServer::builder(route, &root)
                .disable_cache(no_cache)
                .max_bytes_per_entry(max_bytes)
                .sweeper(SweeperConfig {
                    interval: Duration::from_secs(sweep_interval),
                    max_age: Duration::from_secs(max_entry_age),
                })
                .build()
                .context("failed to build file server")?;

            tracing::info!(
                root = %root.display(),
                %listen,
                cache = !no_cache,
                "starting limpet"
            );

            let server = Server::new(listen, files);

            let shutdown = server.shutdown_signal();
            tokio::spawn(async move {
                SignalHandler::new(shutdown).run().await;
            });

            server.run().await.context("server failed")?;

            tracing::info!("server stopped");
            Ok(())
        }
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

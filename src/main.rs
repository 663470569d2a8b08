//! Jobzan tracker server.
//!
//! ```text
//!   client ──▶ listener ──▶ http (router + middleware) ──▶ handlers ──▶ store
//!                                                                        │
//!                                                    JSON snapshot ◀─────┘
//! ```
//!
//! Startup order: config, logging, metrics, store (load + optional demo
//! seed), listener, signal forwarding. The store is saved once the server
//! has drained after shutdown.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use jobzan::config::{apply_port_override, load_config, AppConfig};
use jobzan::lifecycle::{signals, Shutdown};
use jobzan::observability::{logging, metrics};
use jobzan::store::Store;
use jobzan::HttpServer;

#[derive(Parser)]
#[command(name = "jobzan")]
#[command(about = "Job-search tracker API server", long_about = None)]
struct Args {
    /// TOML config file.
    #[arg(short, long, env = "JOBZAN_CONFIG")]
    config: Option<PathBuf>,

    /// Load the demo employers and jobs at startup.
    #[arg(long)]
    seed_demo: bool,

    /// With --seed-demo, clear the store before seeding.
    #[arg(long, requires = "seed_demo")]
    wipe: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    apply_port_override(&mut config, std::env::var("PORT").ok().as_deref());

    logging::init(&config.observability);
    tracing::info!("jobzan v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        auth_enabled = config.auth.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = match &config.store.data_path {
        Some(path) => Store::load_from_file(path)?,
        None => Store::new(None),
    };
    if args.seed_demo || config.store.seed_demo_data {
        store.seed_demo(args.wipe);
    }
    let (employers, jobs) = store.counts();
    tracing::info!(jobs, employers, "Store ready");

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(signals::forward_signals(shutdown.clone()));

    let server = HttpServer::new(config, store);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

//! waterwatch - guided water-supply queries over HTTP or a console.
//!
//! ```bash
//! cargo run -p waterwatch -- --seed data/seed.json --bind 127.0.0.1:8080
//! cargo run -p waterwatch -- --console
//! ```

use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use waterwatch::{build_router, console, AppState};
use waterwatch_core::{QueryService, SeedData, ServiceConfig};

#[derive(Debug, Parser)]
#[command(name = "waterwatch", version, about = "Guided water-supply district queries")]
struct Args {
    /// Address to serve HTTP on.
    #[arg(long, env = "WATERWATCH_BIND", default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Seed file with the catalog, readings and threshold bands.
    #[arg(long, env = "WATERWATCH_SEED", default_value = "data/seed.json")]
    seed: PathBuf,

    /// Seconds of inactivity before a conversation starts over.
    #[arg(long, env = "WATERWATCH_IDLE_SECS", default_value_t = 1800)]
    idle_secs: u64,

    /// Emit logs as JSON.
    #[arg(long, env = "WATERWATCH_LOG_JSON")]
    log_json: bool,

    /// Run one conversation on stdin/stdout instead of serving HTTP.
    #[arg(long)]
    console: bool,
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Logs go to stderr so console replies stay readable.
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(args.log_json);

    let seed = SeedData::load_json(&args.seed)
        .await
        .with_context(|| format!("loading seed {}", args.seed.display()))?;
    info!(
        seed = %seed.metadata.name,
        regions = seed.metadata.regions,
        provinces = seed.metadata.provinces,
        districts = seed.metadata.districts,
        readings = seed.metadata.readings,
        thresholds = seed.metadata.thresholds,
        "seed loaded"
    );

    let config = ServiceConfig::new().with_idle_timeout(Duration::from_secs(args.idle_secs));
    let service = Arc::new(QueryService::from_seed(seed, config)?);

    if args.console {
        return tokio::task::spawn_blocking(move || console::run_console(service))
            .await?
            .context("console I/O");
    }

    let app = build_router(AppState::new(service));
    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("binding {}", args.bind))?;
    info!(addr = %args.bind, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;
    Ok(())
}

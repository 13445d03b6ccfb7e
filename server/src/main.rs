use anyhow::{Context, Result};
use clap::Parser;
use engine::{spawn_loader, EngineConfig, Listing, MemoryStore, SearchEngine};
use server::build_app;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Seed listings JSONL file (one listing per line)
    #[arg(long)]
    listings: Option<String>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Seconds between incremental load cycles
    #[arg(long, default_value_t = 5)]
    poll_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let store = Arc::new(MemoryStore::new());
    if let Some(path) = &args.listings {
        let seeded = seed_store(&store, path)?;
        tracing::info!(seeded, path, "seeded listing store");
    }

    let config = EngineConfig {
        poll_interval: Duration::from_secs(args.poll_secs),
        ..EngineConfig::default()
    };
    let poll_interval = config.poll_interval;
    let engine = SearchEngine::new(store, config);
    let loader = spawn_loader(engine.clone(), poll_interval);

    let app = build_app(engine);
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    loader.shutdown().await;
    Ok(())
}

fn seed_store(store: &MemoryStore, path: &str) -> Result<usize> {
    let file = File::open(path).with_context(|| format!("opening {path}"))?;
    let mut seeded = 0;
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let listing: Listing =
            serde_json::from_str(&line).with_context(|| format!("parsing listing in {path}"))?;
        store.insert(listing);
        seeded += 1;
    }
    Ok(seeded)
}

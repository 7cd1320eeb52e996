use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use viral_post_finder::config::{BackendKind, Config};
use viral_post_finder::pipeline::Pipeline;

/// Used when no queries are passed on the command line.
const DEFAULT_BRAVE_QUERIES: &[&str] = &[
    r#"site:x.com (meme OR "pump.fun" OR solana) status"#,
    r#"site:tiktok.com (solana OR "meme coin" OR pump) video"#,
];

const DEFAULT_NITTER_QUERIES: &[&str] = &["solana meme", "pump fun", "meme coin"];

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    // Missing credentials or bad thresholds stop here, before any request is sent
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let queries = queries_from_args(config.backend);
    info!(backend = ?config.backend, queries = queries.len(), "Configuration loaded");

    let pipeline = Pipeline::from_config(&config).context("Failed to build pipeline")?;

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Shutdown requested, finishing with results gathered so far");
        signal_token.cancel();
    });

    let report = pipeline.run(&queries, shutdown).await;

    let json = serde_json::to_string(&report).context("Failed to serialize report")?;
    println!("{json}");

    Ok(())
}

fn queries_from_args(backend: BackendKind) -> Vec<String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        return args;
    }

    let defaults = match backend {
        BackendKind::Brave => DEFAULT_BRAVE_QUERIES,
        BackendKind::Nitter => DEFAULT_NITTER_QUERIES,
    };
    defaults.iter().map(ToString::to_string).collect()
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,viral_post_finder=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    // stdout carries the report, so logs go to stderr
    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

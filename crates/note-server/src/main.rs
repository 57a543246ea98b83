//! note-search daemon.
//!
//! Indexes a Markdown note corpus for full-text search and serves queries
//! over HTTP while the index is refreshed periodically and on demand.
//!
//! # Usage
//!
//! ```bash
//! note-search [--config PATH] [--port PORT] [--log-level FILTER]
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/note-search/config.toml)
//! 3. `--config` file
//! 4. Environment variables (NOTE_SEARCH_*)

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use note_analysis::JapaneseAnalyzer;
use note_lifecycle::{spawn_periodic_rebuild, IndexLayout, LifecycleManager, RebuildContext};
use note_query::QueryService;
use note_server::{router, AppState};
use note_types::{shared_runtime, AppConfig};

#[derive(Debug, Parser)]
#[command(name = "note-search", about = "Full-text search daemon for a Markdown note corpus")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Override the configured HTTP port
    #[arg(long)]
    port: Option<u16>,

    /// Log filter when RUST_LOG is unset (e.g. "info,note_lifecycle=debug")
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(cli.log_level.as_deref().unwrap_or(&config.log_level))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(corpus = %config.corpus_dir.display(), index = %config.index_dir.display(), "Starting note-search");

    let analyzer = Arc::new(
        JapaneseAnalyzer::from_stopwords_file(&config.stopwords_path)
            .context("building analyzer")?,
    );
    let runtime = shared_runtime(config.runtime.clone());
    let shutdown = CancellationToken::new();

    let lifecycle = LifecycleManager::new(
        RebuildContext {
            corpus_root: config.corpus_dir.clone(),
            layout: IndexLayout::new(config.index_dir.clone()),
            analyzer: analyzer.clone(),
            runtime: runtime.clone(),
        },
        shutdown.clone(),
    );

    // First build (or reopen) completes before the listener comes up, so a
    // served query always has a generation to run against.
    lifecycle
        .open_or_bootstrap()
        .await
        .context("opening or building the initial index")?;

    let periodic = spawn_periodic_rebuild(lifecycle.clone(), shutdown.clone());

    let state = AppState {
        query: Arc::new(QueryService::new(
            config.corpus_dir.clone(),
            analyzer,
            lifecycle.clone(),
        )),
        lifecycle,
        runtime,
    };

    let addr = format!("{}:{}", config.host, cli.port.unwrap_or(config.port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(%addr, "note-search listening");

    let shutdown_signal = shutdown.clone();
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
            // Cancel an in-flight rebuild cooperatively; the active
            // generation is never affected.
            shutdown_signal.cancel();
        })
        .await
        .context("serving")?;

    shutdown.cancel();
    let _ = periodic.await;
    info!("note-search stopped");

    Ok(())
}

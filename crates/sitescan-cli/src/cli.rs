//! Argument parsing and the scan command.

use anyhow::{bail, Context};
use clap::Parser;
use sitescan_browser::BrowserEngine;
use sitescan_core::{AppConfig, ScanSummary};
use sitescan_scanner::{to_csv, BatchRunner, ProgressEvent, ScanBatch, ScanOrchestrator, ScanSession};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "sitescan")]
#[command(about = "Check which web pages mention a keyword")]
#[command(version)]
pub struct Cli {
    /// Keyword to look for (case-insensitive)
    #[arg(short, long)]
    keyword: String,

    /// Number of URLs scanned at once (default 20, capped by config)
    #[arg(short, long, env = "SITESCAN_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Config file to use instead of the platform default
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write results as CSV to this file, or into this directory
    #[arg(long)]
    csv: Option<PathBuf>,

    /// File with one URL per line; reads stdin when omitted
    urls: Option<PathBuf>,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let urls = read_urls(cli.urls.as_deref()).await?;
    let batch = ScanBatch::with_limits(&urls, &cli.keyword, cli.concurrency, &config.scanning)?;

    info!("Starting Sitescan v{}", env!("CARGO_PKG_VERSION"));

    let engine = Arc::new(BrowserEngine::new(config.browser.clone()));
    let orchestrator = ScanOrchestrator::from_config(&config, engine.clone())?;
    let mut session = ScanSession::start(BatchRunner::new(orchestrator), engine, batch);

    let cancel = session.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing in-flight URLs");
            cancel.cancel();
        }
    });

    let mut stdout = std::io::stdout();
    while let Some(event) = session.next_event().await {
        if let ProgressEvent::Complete { summary, .. } = &event {
            log_summary(summary);
        }
        writeln!(stdout, "{}", serde_json::to_string(&event)?)?;
        stdout.flush()?;
    }

    let results = session.finish().await?;

    if let Some(target) = cli.csv {
        let path = csv_path(&target);
        std::fs::write(&path, to_csv(&results, cli.keyword.trim())?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote {} rows to {}", results.len(), path.display());
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => {
            let mut config = AppConfig::load_from(path)?;
            config.apply_env();
            config.validate()?;
            config
        }
        None => AppConfig::load_with_env()?,
    };
    Ok(config)
}

async fn read_urls(path: Option<&Path>) -> anyhow::Result<Vec<String>> {
    let contents = match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };

    let urls = parse_url_list(&contents);
    if urls.is_empty() {
        bail!("No URLs given");
    }
    Ok(urls)
}

/// One URL per line; blank lines and `#` comments are ignored.
fn parse_url_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect()
}

/// A directory target gets a dated file name.
fn csv_path(target: &Path) -> PathBuf {
    if target.is_dir() {
        let date = chrono::Local::now().format("%Y-%m-%d");
        target.join(format!("scan-results-{date}.csv"))
    } else {
        target.to_path_buf()
    }
}

fn log_summary(summary: &ScanSummary) {
    info!(
        "Scan complete: {} found, {} not found, {} errors, {} skipped ({} total)",
        summary.found, summary.not_found, summary.errors, summary.skipped, summary.total
    );
}

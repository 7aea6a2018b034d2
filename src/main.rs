//! Linkrot main entry point
//!
//! Command-line interface for the broken-link crawler: argument parsing,
//! logging setup, and signal wiring around the crawl engine.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use linkrot::config::{parse_lenient_bool, CrawlOptions, DEFAULT_MAX_DEPTH};
use linkrot::crawler::{CrawlEngine, CrawlOutcome};
use linkrot::report;
use linkrot::store::StateStore;
use tracing_subscriber::EnvFilter;

/// Find broken links on a website, with resume support
///
/// Linkrot crawls breadth-first from START_URL up to MAX_DEPTH link hops,
/// records every link that fails to connect or returns an HTTP error
/// status, and writes a JSON report. Interrupting with Ctrl-C saves
/// progress; running the same command again resumes where the previous
/// run stopped.
#[derive(Parser, Debug)]
#[command(name = "linkrot")]
#[command(version)]
#[command(about = "Find broken links on a website, with resume support", long_about = None)]
struct Cli {
    /// URL to start crawling from (http:// or https://)
    #[arg(value_name = "START_URL")]
    start_url: String,

    /// Maximum crawling depth; 0 checks only the start URL
    #[arg(value_name = "MAX_DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: u32,

    /// Restrict crawling to the start URL's host (true/false)
    #[arg(value_name = "SAME_DOMAIN_ONLY", default_value = "true", value_parser = parse_lenient_bool)]
    same_domain_only: bool,

    /// Start a fresh crawl, ignoring any previous state
    #[arg(long)]
    fresh: bool,

    /// Override the derived state file path
    #[arg(long, value_name = "PATH")]
    state_file: Option<PathBuf>,

    /// Override the generated report file path
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let options = CrawlOptions::new(&cli.start_url, cli.max_depth, cli.same_domain_only)
        .context("invalid arguments")?;

    let store = match cli.state_file {
        Some(path) => StateStore::at_path(path),
        None => StateStore::for_options(&options),
    };
    tracing::info!("State file: {}", store.path().display());

    let report_path = cli.report.unwrap_or_else(report::default_report_path);

    let mut engine = CrawlEngine::new(options, store, cli.fresh)
        .context("failed to initialize the crawler")?;
    engine.set_report_path(Some(report_path));

    spawn_signal_listener(engine.cancel_flag());

    match engine.run().await.context("crawl failed")? {
        CrawlOutcome::Completed => Ok(()),
        CrawlOutcome::Interrupted => {
            tracing::info!("Run the same command again to resume");
            Ok(())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkrot=info,warn"),
            1 => EnvFilter::new("linkrot=debug,info"),
            2 => EnvFilter::new("linkrot=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Sets the cancellation flag on SIGINT or SIGTERM.
///
/// The engine observes the flag between tasks, persists its state, and
/// stops; the signal never interrupts a mutation in progress.
fn spawn_signal_listener(cancel: Arc<AtomicBool>) {
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        tracing::info!("Shutdown signal received, stopping after the current page...");
        cancel.store(true, Ordering::SeqCst);
    });
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!("Could not install SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

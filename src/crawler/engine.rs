//! Crawl engine - bounded breadth-first traversal with checkpointing
//!
//! The engine owns the FIFO task queue, the visited set, and the broken-link
//! list. Each iteration pops one task, fetches it, classifies the outcome,
//! and (for healthy HTML pages within the depth bound) enqueues the links it
//! discovers. State is checkpointed every few pages and on interruption, so
//! a killed run continues from its last snapshot.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use url::Url;

use crate::config::CrawlOptions;
use crate::crawler::{FetchOutcome, Fetcher, HtmlLinkExtractor, HttpFetcher, LinkExtractor};
use crate::report::{self, CrawlReport};
use crate::state::{BrokenLink, CrawlState, CrawlTask};
use crate::store::StateStore;
use crate::url::{normalize_link, same_host};
use crate::Result;

/// How often the state is checkpointed, in processed pages.
const SAVE_INTERVAL_PAGES: u64 = 10;

/// Fixed politeness delay between fetches.
const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(500);

/// Terminal result of a crawl run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// The queue drained: report written, state file removed.
    Completed,

    /// Cancellation was observed: state persisted for a later resume, no
    /// report written.
    Interrupted,
}

/// Drives one crawl from seed to completion or interruption.
///
/// The engine exclusively owns its [`CrawlState`] while running; the store
/// only ever sees point-in-time snapshots taken between tasks.
pub struct CrawlEngine<F = HttpFetcher, E = HtmlLinkExtractor> {
    options: CrawlOptions,
    state: CrawlState,
    fetcher: F,
    extractor: E,
    store: StateStore,
    cancel: Arc<AtomicBool>,
    request_delay: Duration,
    report_path: Option<PathBuf>,
}

impl CrawlEngine<HttpFetcher, HtmlLinkExtractor> {
    /// Engine with the real HTTP fetcher and HTML extractor.
    ///
    /// Unless `fresh` is set, a usable snapshot in the store is resumed;
    /// a missing, mismatched, or corrupt snapshot falls back to a fresh
    /// crawl (logged, never fatal).
    pub fn new(options: CrawlOptions, store: StateStore, fresh: bool) -> Result<Self> {
        let fetcher = HttpFetcher::new()?;
        Ok(Self::with_parts(
            options,
            store,
            fetcher,
            HtmlLinkExtractor,
            fresh,
        ))
    }
}

impl<F: Fetcher, E: LinkExtractor> CrawlEngine<F, E> {
    /// Engine with injected fetch and extraction capabilities.
    pub fn with_parts(
        options: CrawlOptions,
        store: StateStore,
        fetcher: F,
        extractor: E,
        fresh: bool,
    ) -> Self {
        let state = if fresh {
            tracing::info!("Starting fresh crawl (ignoring previous state)");
            CrawlState::new(&options)
        } else {
            Self::load_or_fresh(&options, &store)
        };

        Self {
            options,
            state,
            fetcher,
            extractor,
            store,
            cancel: Arc::new(AtomicBool::new(false)),
            request_delay: DEFAULT_REQUEST_DELAY,
            report_path: None,
        }
    }

    fn load_or_fresh(options: &CrawlOptions, store: &StateStore) -> CrawlState {
        match store.load() {
            Ok(Some(state)) if state.matches(options) => {
                tracing::info!(
                    "Resumed from state file: {} visited, {} queued, {} broken links so far",
                    state.visited.len(),
                    state.queue.len(),
                    state.broken_links.len()
                );
                state
            }
            Ok(Some(_)) => {
                tracing::warn!(
                    "State file {} belongs to a different configuration, starting fresh",
                    store.path().display()
                );
                CrawlState::new(options)
            }
            Ok(None) => {
                tracing::info!("No previous state file found, starting fresh");
                CrawlState::new(options)
            }
            Err(e) => {
                tracing::warn!("Could not use previous state ({}), starting fresh", e);
                CrawlState::new(options)
            }
        }
    }

    /// Cancellation flag observed between iterations.
    ///
    /// Setting it stops the crawl at the next loop boundary with the state
    /// persisted; the task about to run stays in the queue.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Overrides the politeness delay between fetches.
    pub fn set_request_delay(&mut self, delay: Duration) {
        self.request_delay = delay;
    }

    /// Report file written on completion. None skips the file and only logs
    /// the summary.
    pub fn set_report_path(&mut self, path: Option<PathBuf>) {
        self.report_path = path;
    }

    /// Current crawl state.
    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    /// Report object for the current state.
    pub fn build_report(&self) -> CrawlReport {
        CrawlReport::from_state(&self.state)
    }

    /// Runs the main crawl loop until the queue drains or cancellation is
    /// observed.
    pub async fn run(&mut self) -> Result<CrawlOutcome> {
        tracing::info!(
            "Starting broken link check for {} (max depth {}, same domain only: {})",
            self.state.start_url,
            self.state.max_depth,
            self.state.same_domain_only
        );

        loop {
            if self.cancel.load(Ordering::SeqCst) {
                return self.interrupt();
            }

            let task = match self.state.queue.pop_front() {
                Some(task) => task,
                None => break,
            };

            // Possible only in snapshots written by an older configuration;
            // never fetched.
            if task.depth > self.state.max_depth {
                continue;
            }

            self.process_task(&task).await;

            self.state.pages_visited_count += 1;
            if self.state.pages_visited_count % SAVE_INTERVAL_PAGES == 0 {
                tracing::info!(
                    "Progress: {} pages visited, {} broken links, {} queued",
                    self.state.pages_visited_count,
                    self.state.broken_links.len(),
                    self.state.queue.len()
                );
                self.checkpoint();
            }

            if !self.state.queue.is_empty() && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
        }

        self.complete()
    }

    /// Fetches one task and folds the outcome into the state.
    ///
    /// A failed fetch is recorded and the crawl continues; nothing here
    /// aborts the loop.
    async fn process_task(&mut self, task: &CrawlTask) {
        tracing::info!("Crawling (depth {}): {}", task.depth, task.url);

        match self.fetcher.fetch(&task.url).await {
            FetchOutcome::Reachable { status_code, body } => {
                tracing::debug!("OK: {} ({})", task.url, status_code);
                if task.depth < self.state.max_depth {
                    if let Some(body) = body {
                        self.enqueue_links(task, &body);
                    }
                }
            }
            outcome @ FetchOutcome::HttpError { .. }
            | outcome @ FetchOutcome::ConnectionError { .. } => {
                self.record_broken(task, outcome.describe());
            }
        }
    }

    fn record_broken(&mut self, task: &CrawlTask, status: String) {
        tracing::warn!("BROKEN LINK: {} ({})", task.url, status);

        // The seed has no referrer; attribute it to itself.
        let found_on = task.found_on.clone().unwrap_or_else(|| task.url.clone());

        self.state.broken_links.push(BrokenLink {
            url: task.url.clone(),
            status,
            found_on,
            depth: task.depth,
            timestamp: Utc::now(),
        });
    }

    /// Normalizes, filters, and enqueues the links discovered on a page.
    ///
    /// Malformed links are dropped silently; already-seen URLs are skipped;
    /// children are enqueued one hop deeper than their referrer.
    fn enqueue_links(&mut self, task: &CrawlTask, body: &str) {
        let base = match Url::parse(&task.url) {
            Ok(url) => url,
            Err(_) => return,
        };

        let links = self.extractor.extract_links(body, &base);
        tracing::debug!("Found {} links on {}", links.len(), task.url);

        for raw in links {
            let normalized = match normalize_link(&raw) {
                Ok(url) => url,
                Err(_) => continue,
            };

            if self.state.same_domain_only && !same_host(&normalized, &self.options.start_url) {
                continue;
            }

            let url = normalized.to_string();
            if !self.state.mark_seen(&url) {
                continue;
            }

            self.state.queue.push_back(CrawlTask {
                url,
                depth: task.depth + 1,
                found_on: Some(task.url.clone()),
            });
        }
    }

    /// Periodic checkpoint. A write failure is logged and the crawl carries
    /// on in memory; only resume capability is lost.
    fn checkpoint(&mut self) {
        if let Err(e) = self.store.save(&self.state) {
            tracing::error!(
                "Failed to persist state to {}: {}",
                self.store.path().display(),
                e
            );
        }
    }

    fn interrupt(&mut self) -> Result<CrawlOutcome> {
        tracing::info!(
            "Interrupted: {} pages visited, {} broken links, {} tasks still queued",
            self.state.pages_visited_count,
            self.state.broken_links.len(),
            self.state.queue.len()
        );

        self.store.save(&self.state)?;
        tracing::info!("State saved to {}", self.store.path().display());

        Ok(CrawlOutcome::Interrupted)
    }

    fn complete(&mut self) -> Result<CrawlOutcome> {
        let crawl_report = self.build_report();

        tracing::info!(
            "Crawl completed: {} pages visited, {} broken links found",
            crawl_report.summary.total_pages_visited,
            crawl_report.summary.total_broken_links
        );

        if crawl_report.broken_links.is_empty() {
            tracing::info!("No broken links found!");
        } else {
            tracing::info!("Broken links found:");
            for link in &crawl_report.broken_links {
                tracing::info!(
                    "  - {} ({}) found on {}",
                    link.url,
                    link.status,
                    link.found_on
                );
            }
        }

        if let Some(path) = &self.report_path {
            report::write_report(&crawl_report, path)?;
            tracing::info!("Report written to {}", path.display());
        }

        // The report is on disk; the snapshot has served its purpose.
        self.store.delete();

        Ok(CrawlOutcome::Completed)
    }
}

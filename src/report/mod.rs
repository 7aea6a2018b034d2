//! Final report rendering
//!
//! On completion the engine hands its state here to be turned into the JSON
//! report file: a summary block, the broken links, and every visited URL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::state::{BrokenLink, CrawlState};

/// Errors that can occur while writing a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Headline numbers for a finished crawl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub start_url: String,
    pub total_pages_visited: u64,
    pub total_broken_links: u64,
    pub max_depth: u32,
    pub same_domain_only: bool,
    pub scan_completed: DateTime<Utc>,
}

/// The complete report object written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    pub summary: ReportSummary,
    pub broken_links: Vec<BrokenLink>,
    pub visited_urls: Vec<String>,
}

impl CrawlReport {
    /// Builds the report from a crawl state.
    ///
    /// Visited URLs are sorted so the output is stable run to run.
    pub fn from_state(state: &CrawlState) -> Self {
        let mut visited_urls: Vec<String> = state.visited.iter().cloned().collect();
        visited_urls.sort();

        Self {
            summary: ReportSummary {
                start_url: state.start_url.clone(),
                total_pages_visited: state.pages_visited_count,
                total_broken_links: state.broken_links.len() as u64,
                max_depth: state.max_depth,
                same_domain_only: state.same_domain_only,
                scan_completed: Utc::now(),
            },
            broken_links: state.broken_links.clone(),
            visited_urls,
        }
    }
}

/// Default report file name, e.g. `broken_links_report_20260806_154500.json`.
pub fn default_report_path() -> PathBuf {
    PathBuf::from(format!(
        "broken_links_report_{}.json",
        Utc::now().format("%Y%m%d_%H%M%S")
    ))
}

/// Writes the report as pretty-printed JSON.
pub fn write_report(report: &CrawlReport, path: &Path) -> Result<(), ReportError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

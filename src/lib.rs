//! Linkrot: a resumable broken-link crawler
//!
//! This crate implements a breadth-first website crawler that reports broken
//! links (targets that fail to connect or answer with an HTTP error status).
//! Progress is checkpointed to a state file, so an interrupted run can be
//! resumed by invoking the tool again with the same arguments.

pub mod config;
pub mod crawler;
pub mod report;
pub mod state;
pub mod store;
pub mod url;

use thiserror::Error;

/// Main error type for linkrot operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("State store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Report error: {0}")]
    Report(#[from] report::ReportError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for linkrot operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::CrawlOptions;
pub use crawler::{CrawlEngine, CrawlOutcome, FetchOutcome, Fetcher};
pub use state::{BrokenLink, CrawlState, CrawlTask};
pub use store::StateStore;

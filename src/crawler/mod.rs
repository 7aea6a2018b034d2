//! Crawler module: fetching, link extraction, and the traversal engine
//!
//! - `fetcher`: HTTP requests and outcome classification
//! - `parser`: link extraction from fetched HTML
//! - `engine`: the breadth-first crawl loop with checkpointing

mod engine;
mod fetcher;
mod parser;

pub use engine::{CrawlEngine, CrawlOutcome};
pub use fetcher::{build_http_client, FetchOutcome, Fetcher, HttpFetcher};
pub use parser::{HtmlLinkExtractor, LinkExtractor};

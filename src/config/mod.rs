//! Crawl configuration
//!
//! Options arrive as command-line arguments rather than a config file. This
//! module validates them and derives the fingerprint used to name the
//! persisted state file, so different argument sets checkpoint to different
//! files and can run side by side.

use sha2::{Digest, Sha256};
use url::Url;

use crate::CrawlError;

/// Default maximum crawling depth.
pub const DEFAULT_MAX_DEPTH: u32 = 3;

/// Validated options for a single crawl.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Seed URL the traversal starts from.
    pub start_url: Url,

    /// Maximum number of link hops from the seed. Zero checks only the seed.
    pub max_depth: u32,

    /// When set, links whose host differs from the seed's host are discarded.
    pub same_domain_only: bool,
}

impl CrawlOptions {
    /// Validates and builds the crawl options.
    ///
    /// The start URL must be an absolute HTTP or HTTPS URL with a host;
    /// anything else is an `InvalidArgument` error and no crawl starts.
    pub fn new(start_url: &str, max_depth: u32, same_domain_only: bool) -> crate::Result<Self> {
        let url = Url::parse(start_url).map_err(|e| {
            CrawlError::InvalidArgument(format!("invalid start URL '{}': {}", start_url, e))
        })?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(CrawlError::InvalidArgument(format!(
                    "start URL must use http or https, got '{}'",
                    other
                )))
            }
        }

        if url.host_str().is_none() {
            return Err(CrawlError::InvalidArgument(format!(
                "start URL '{}' has no host",
                start_url
            )));
        }

        Ok(Self {
            start_url: url,
            max_depth,
            same_domain_only,
        })
    }

    /// Host of the seed URL, used by the same-domain filter.
    pub fn start_host(&self) -> &str {
        // Host presence is validated in `new`.
        self.start_url.host_str().unwrap_or_default()
    }

    /// First 8 hex characters of the SHA-256 over the argument set.
    pub fn config_hash(&self) -> String {
        let fingerprint = format!(
            "{}|{}|{}",
            self.start_url, self.max_depth, self.same_domain_only
        );
        let mut hasher = Sha256::new();
        hasher.update(fingerprint.as_bytes());
        let digest = hex::encode(hasher.finalize());
        digest[..8].to_string()
    }

    /// Derived state file name, e.g.
    /// `crawl_state_example.com_depth3_same-domain_5f2d8a1c.json`.
    pub fn state_file_name(&self) -> String {
        let host = self.start_host().trim_start_matches("www.");
        let clean_host: String = host
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '.' || *c == '-')
            .collect();
        let mode = if self.same_domain_only {
            "same-domain"
        } else {
            "all-domains"
        };
        format!(
            "crawl_state_{}_depth{}_{}_{}.json",
            clean_host,
            self.max_depth,
            mode,
            self.config_hash()
        )
    }
}

/// Lenient boolean parsing for the positional `same_domain_only` argument.
///
/// Accepts `true/t/1/yes/y` and `false/f/0/no/n`, case-insensitive.
pub fn parse_lenient_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        other => Err(format!("expected true or false, got '{}'", other)),
    }
}

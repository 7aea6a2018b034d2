//! HTTP fetcher implementation
//!
//! One GET per URL, redirects followed transparently by the client. The
//! response is folded into the three classes the engine cares about:
//! reachable, HTTP error, connection error.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Classified result of fetching a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Final status in [200, 399] after redirects. `body` is present only
    /// for HTML responses; a healthy non-HTML target yields no links.
    Reachable {
        status_code: u16,
        body: Option<String>,
    },

    /// Final status in [400, 599].
    HttpError { status_code: u16, reason: String },

    /// The request never produced a status: timeout, DNS failure, refused
    /// connection, TLS error.
    ConnectionError { error: String },
}

impl FetchOutcome {
    /// Description recorded for a broken link, e.g. `"404 Not Found"` or
    /// `"request timed out"`.
    pub fn describe(&self) -> String {
        match self {
            Self::Reachable { status_code, .. } => status_code.to_string(),
            Self::HttpError {
                status_code,
                reason,
            } => format!("{} {}", status_code, reason),
            Self::ConnectionError { error } => error.clone(),
        }
    }
}

/// Fetch capability used by the crawl engine.
///
/// Implemented by [`HttpFetcher`] for real crawls; tests substitute
/// deterministic implementations.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

/// Builds the HTTP client shared by every fetch of a crawl.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let user_agent = format!("linkrot/{}", env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(15))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetcher backed by a shared reqwest client.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client()?,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                let error = if e.is_timeout() {
                    "request timed out".to_string()
                } else if e.is_connect() {
                    format!("connection failed: {}", e)
                } else {
                    e.to_string()
                };
                return FetchOutcome::ConnectionError { error };
            }
        };

        let status = response.status();
        let status_code = status.as_u16();

        if status_code >= 400 {
            return FetchOutcome::HttpError {
                status_code,
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            };
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("text/html"))
            .unwrap_or(false);

        if !is_html {
            return FetchOutcome::Reachable {
                status_code,
                body: None,
            };
        }

        match response.text().await {
            Ok(body) => FetchOutcome::Reachable {
                status_code,
                body: Some(body),
            },
            // The status already said the page is healthy; losing the body
            // only loses its links.
            Err(_) => FetchOutcome::Reachable {
                status_code,
                body: None,
            },
        }
    }
}

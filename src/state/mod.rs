//! Crawl state data model
//!
//! Everything needed to continue an interrupted crawl lives in [`CrawlState`]:
//! the pending task queue, the set of URLs already seen, the broken links
//! recorded so far, and the visit counter. The whole struct is the unit of
//! persistence; the engine owns and mutates it, the store only serializes it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

use crate::config::CrawlOptions;

/// A pending unit of work: fetch `url`, `depth` link hops from the seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlTask {
    pub url: String,

    pub depth: u32,

    /// Page that linked to this URL. `None` for the seed task.
    #[serde(default)]
    pub found_on: Option<String>,
}

/// A link that failed to connect or returned an HTTP error status.
///
/// Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenLink {
    pub url: String,

    /// Human-readable failure description: `"404 Not Found"` for HTTP
    /// errors, the error text (e.g. `"request timed out"`) for
    /// connectivity failures.
    pub status: String,

    /// URL of the page the broken link was found on.
    pub found_on: String,

    pub depth: u32,

    pub timestamp: DateTime<Utc>,
}

/// Full snapshot of an in-progress crawl.
///
/// `visited` holds every normalized URL that has been enqueued or dequeued;
/// membership only ever grows, which is what keeps the traversal idempotent
/// across a persist/resume cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlState {
    pub start_url: String,
    pub max_depth: u32,
    pub same_domain_only: bool,
    pub queue: VecDeque<CrawlTask>,
    pub visited: HashSet<String>,
    pub broken_links: Vec<BrokenLink>,
    pub pages_visited_count: u64,
}

impl CrawlState {
    /// Creates a fresh state with the seed task queued and marked visited.
    pub fn new(options: &CrawlOptions) -> Self {
        let start = options.start_url.as_str().to_string();

        let mut visited = HashSet::new();
        visited.insert(start.clone());

        let mut queue = VecDeque::new();
        queue.push_back(CrawlTask {
            url: start.clone(),
            depth: 0,
            found_on: None,
        });

        Self {
            start_url: start,
            max_depth: options.max_depth,
            same_domain_only: options.same_domain_only,
            queue,
            visited,
            broken_links: Vec::new(),
            pages_visited_count: 0,
        }
    }

    /// True when this snapshot was produced by the same argument set.
    ///
    /// A persisted state is only resumed for the exact configuration that
    /// created it; anything else starts fresh.
    pub fn matches(&self, options: &CrawlOptions) -> bool {
        self.start_url == options.start_url.as_str()
            && self.max_depth == options.max_depth
            && self.same_domain_only == options.same_domain_only
    }

    /// Check-and-insert into the visited set.
    ///
    /// Returns true if the URL had not been seen before (and is now
    /// recorded). One atomic operation, so a URL can never be enqueued twice.
    pub fn mark_seen(&mut self, url: &str) -> bool {
        self.visited.insert(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_options() -> CrawlOptions {
        CrawlOptions::new("https://example.com/", 3, true).unwrap()
    }

    #[test]
    fn test_fresh_state_seeds_queue() {
        let state = CrawlState::new(&test_options());

        assert_eq!(state.queue.len(), 1);
        let seed = &state.queue[0];
        assert_eq!(seed.url, "https://example.com/");
        assert_eq!(seed.depth, 0);
        assert_eq!(seed.found_on, None);

        assert!(state.visited.contains("https://example.com/"));
        assert!(state.broken_links.is_empty());
        assert_eq!(state.pages_visited_count, 0);
    }

    #[test]
    fn test_mark_seen_is_check_and_insert() {
        let mut state = CrawlState::new(&test_options());

        assert!(state.mark_seen("https://example.com/new"));
        assert!(!state.mark_seen("https://example.com/new"));
        assert!(!state.mark_seen("https://example.com/"));
    }

    #[test]
    fn test_matches_same_configuration() {
        let options = test_options();
        let state = CrawlState::new(&options);
        assert!(state.matches(&options));
    }

    #[test]
    fn test_matches_rejects_other_configurations() {
        let state = CrawlState::new(&test_options());

        let other_url = CrawlOptions::new("https://other.com/", 3, true).unwrap();
        let other_depth = CrawlOptions::new("https://example.com/", 5, true).unwrap();
        let other_mode = CrawlOptions::new("https://example.com/", 3, false).unwrap();

        assert!(!state.matches(&other_url));
        assert!(!state.matches(&other_depth));
        assert!(!state.matches(&other_mode));
    }

    #[test]
    fn test_serde_round_trip() {
        let mut state = CrawlState::new(&test_options());
        state.mark_seen("https://example.com/a");
        state.queue.push_back(CrawlTask {
            url: "https://example.com/a".to_string(),
            depth: 1,
            found_on: Some("https://example.com/".to_string()),
        });
        state.broken_links.push(BrokenLink {
            url: "https://example.com/missing".to_string(),
            status: "404 Not Found".to_string(),
            found_on: "https://example.com/".to_string(),
            depth: 1,
            timestamp: Utc::now(),
        });
        state.pages_visited_count = 1;

        let json = serde_json::to_string(&state).unwrap();
        let restored: CrawlState = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.start_url, state.start_url);
        assert_eq!(restored.queue, state.queue);
        assert_eq!(restored.visited, state.visited);
        assert_eq!(restored.broken_links, state.broken_links);
        assert_eq!(restored.pages_visited_count, 1);
    }

    #[test]
    fn test_task_without_found_on_deserializes() {
        // Queue entries written before the referrer field existed.
        let task: CrawlTask =
            serde_json::from_str(r#"{"url": "https://example.com/", "depth": 0}"#).unwrap();
        assert_eq!(task.found_on, None);
    }
}

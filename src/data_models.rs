use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A validated search, built once per incoming call and consumed by the
/// orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub start_page: u32,
    pub page_count: u32,
    pub detail: bool,
    pub limit: Option<usize>,
    pub delay_secs: f64,
}

impl SearchRequest {
    /// Last page of the requested range (inclusive). The validator guarantees
    /// this does not overflow.
    pub fn end_page(&self) -> u32 {
        self.start_page + (self.page_count - 1)
    }

    /// Pacing wait between pages. Values too large for a `Duration` saturate
    /// instead of panicking.
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_secs).unwrap_or(Duration::MAX)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    RangeExhausted,
    EmptyPage,
    LimitReached,
    FetchError,
    Cancelled,
}

/// What one run of the orchestrator actually retrieved.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateOutcome<T> {
    pub items: Vec<T>,
    pub pages_attempted: u32,
    pub termination: TerminationReason,
}

impl<T> AggregateOutcome<T> {
    pub fn count(&self) -> usize {
        self.items.len()
    }
}

/// One search hit as scraped from the news source.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    pub image: Option<String>,
    pub published: Option<String>,
    pub category: Option<String>,
    pub summary: Option<String>,
    /// Full article text, only filled for detail searches.
    pub content: Option<String>,
    pub scraped_at: String,
}

impl NewsItem {
    pub fn new(title: String, url: String) -> NewsItem {
        NewsItem {
            title,
            url,
            image: None,
            published: None,
            category: None,
            summary: None,
            content: None,
            scraped_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

use serde::Serialize;

use crate::data_models::{AggregateOutcome, SearchRequest};

pub const RESULTS_FOUND: &str = "results found";
pub const NO_RESULTS_FOUND: &str = "no results found";

/// The request parameters as echoed back to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchParameters {
    pub query: String,
    pub page: u32,
    pub pages: u32,
    pub detail: bool,
    pub limit: Option<usize>,
    pub delay: f64,
}

impl From<&SearchRequest> for SearchParameters {
    fn from(request: &SearchRequest) -> Self {
        SearchParameters {
            query: request.query.clone(),
            page: request.start_page,
            pages: request.page_count,
            detail: request.detail,
            limit: request.limit,
            delay: request.delay_secs,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchReply<T> {
    pub status: u16,
    pub parameters: SearchParameters,
    pub data: Vec<T>,
    pub count: usize,
    pub pages_scraped: u32,
    pub message: String,
}

/// Packages an outcome for the client. The message depends only on whether
/// anything was found, never on why the run stopped.
pub fn assemble<T>(request: &SearchRequest, outcome: AggregateOutcome<T>) -> SearchReply<T> {
    let message = if outcome.items.is_empty() {
        NO_RESULTS_FOUND
    } else {
        RESULTS_FOUND
    };

    SearchReply {
        status: 200,
        parameters: SearchParameters::from(request),
        count: outcome.items.len(),
        pages_scraped: outcome.pages_attempted,
        data: outcome.items,
        message: message.to_string(),
    }
}

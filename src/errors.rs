use thiserror::Error;

pub const SEARCH_EXAMPLE: &str = "/search?q=politik&pages=2&detail=true";

/// Rejection of a malformed search before any fetch happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidArgument {
    #[error("query required")]
    MissingQuery,
    #[error("page range must be positive")]
    NonPositivePageRange,
    #[error("page range is too large")]
    PageRangeOverflow,
    #[error("delay must be non-negative")]
    NegativeDelay,
    #[error("parameter '{name}' must be {expected}, got '{value}'")]
    Malformed {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl InvalidArgument {
    /// Usage hint returned to the client alongside the error.
    pub fn example(&self) -> Option<&'static str> {
        match self {
            InvalidArgument::MissingQuery => Some(SEARCH_EXAMPLE),
            _ => None,
        }
    }
}

/// Failure of a single page fetch. The orchestrator absorbs it as a
/// termination reason.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("failed to parse page {url}: {reason}")]
    Parse { url: String, reason: String },
    #[error("{0}")]
    Upstream(String),
}

#[derive(Debug, Error)]
pub enum XmlToolError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("input has no root element line")]
    MissingRoot,
    #[error("unterminated <data> section starting at byte {0}")]
    UnterminatedSection(usize),
    #[error("xml parse error: {0}")]
    Parse(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

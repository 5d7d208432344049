use async_trait::async_trait;

use crate::errors::FetchError;

/// Fetches one page of search results from the news source.
///
/// Implementations hold no per-request state and may be called concurrently
/// from independent searches.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    type Item: Send;

    async fn fetch_page(
        &self,
        query: &str,
        page: u32,
        detail: bool,
    ) -> Result<Vec<Self::Item>, FetchError>;
}

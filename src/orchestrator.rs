use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::data_models::{AggregateOutcome, SearchRequest, TerminationReason};
use crate::fetcher::PageFetcher;

/// Walks the requested page range one page at a time, accumulating results
/// until the range, the source or the limit runs out.
pub struct PageOrchestrator<F: ?Sized> {
    fetcher: Arc<F>,
}

impl<F: ?Sized> Clone for PageOrchestrator<F> {
    fn clone(&self) -> Self {
        PageOrchestrator {
            fetcher: self.fetcher.clone(),
        }
    }
}

impl<F> PageOrchestrator<F>
where
    F: PageFetcher + ?Sized,
{
    pub fn new(fetcher: Arc<F>) -> PageOrchestrator<F> {
        PageOrchestrator { fetcher }
    }

    /// Runs one search to completion or cancellation.
    ///
    /// Never fails: an empty page, a fetch error, the limit and cancellation
    /// all end the run with whatever was accumulated so far.
    pub async fn run(
        &self,
        request: &SearchRequest,
        cancel: &CancellationToken,
    ) -> AggregateOutcome<F::Item> {
        if request.limit == Some(0) {
            return AggregateOutcome {
                items: Vec::new(),
                pages_attempted: 0,
                termination: TerminationReason::LimitReached,
            };
        }

        let end = request.end_page();
        let mut current = request.start_page;
        let mut pages_attempted = 0u32;
        let mut items = Vec::new();

        let termination = 'pages: loop {
            if cancel.is_cancelled() {
                break 'pages TerminationReason::Cancelled;
            }

            pages_attempted += 1;
            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => break 'pages TerminationReason::Cancelled,
                fetched = self.fetcher.fetch_page(&request.query, current, request.detail) => fetched,
            };

            match fetched {
                Err(e) => {
                    log::error!("error fetching page {current} for {:?}: {:#}", request.query, e);
                    break 'pages TerminationReason::FetchError;
                }
                Ok(page) if page.is_empty() => {
                    log::info!("no results on page {current}");
                    break 'pages TerminationReason::EmptyPage;
                }
                Ok(page) => {
                    log::debug!("page {current} returned {} items", page.len());
                    items.extend(page);
                }
            }

            if let Some(limit) = request.limit {
                if items.len() >= limit {
                    items.truncate(limit);
                    break 'pages TerminationReason::LimitReached;
                }
            }

            if current == end {
                break 'pages TerminationReason::RangeExhausted;
            }
            current += 1;

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break 'pages TerminationReason::Cancelled,
                _ = tokio::time::sleep(request.delay()) => {}
            }
        };

        log::info!(
            "search {:?} finished: {} items over {} pages ({:?})",
            request.query,
            items.len(),
            pages_attempted,
            termination
        );

        AggregateOutcome {
            items,
            pages_attempted,
            termination,
        }
    }
}

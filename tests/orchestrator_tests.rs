use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use newsharvest::data_models::{SearchRequest, TerminationReason};
use newsharvest::orchestrator::PageOrchestrator;

mod test_helpers {
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use newsharvest::data_models::SearchRequest;
    use newsharvest::errors::FetchError;
    use newsharvest::fetcher::PageFetcher;

    pub enum Script {
        Items(Vec<u32>),
        Fail,
        Hang,
    }

    /// Serves canned pages and records which pages were asked for.
    /// Pages without a script come back empty.
    #[derive(Default)]
    pub struct ScriptedFetcher {
        pages: HashMap<u32, Script>,
        calls: Mutex<Vec<u32>>,
    }

    impl ScriptedFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn page(mut self, page: u32, script: Script) -> Self {
            self.pages.insert(page, script);
            self
        }

        /// Page `page` holds `count` items numbered `page * 100 + i`.
        pub fn items(self, page: u32, count: u32) -> Self {
            self.page(page, Script::Items((0..count).map(|i| page * 100 + i).collect()))
        }

        pub fn calls(&self) -> Vec<u32> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        type Item = u32;

        async fn fetch_page(
            &self,
            _query: &str,
            page: u32,
            _detail: bool,
        ) -> Result<Vec<u32>, FetchError> {
            self.calls.lock().unwrap().push(page);
            match self.pages.get(&page) {
                Some(Script::Items(items)) => Ok(items.clone()),
                Some(Script::Fail) => Err(FetchError::Upstream(format!("page {page} blew up"))),
                Some(Script::Hang) => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
                None => Ok(Vec::new()),
            }
        }
    }

    pub fn request(start_page: u32, page_count: u32, limit: Option<usize>, delay_secs: f64) -> SearchRequest {
        SearchRequest {
            query: "politik".to_string(),
            start_page,
            page_count,
            detail: false,
            limit,
            delay_secs,
        }
    }
}

use test_helpers::{Script, ScriptedFetcher, request};

async fn run(
    fetcher: &Arc<ScriptedFetcher>,
    req: &SearchRequest,
) -> newsharvest::data_models::AggregateOutcome<u32> {
    PageOrchestrator::new(fetcher.clone())
        .run(req, &CancellationToken::new())
        .await
}

#[tokio::test(start_paused = true)]
async fn test_two_full_pages_exhaust_range() {
    let fetcher = Arc::new(ScriptedFetcher::new().items(1, 5).items(2, 3));
    let outcome = run(&fetcher, &request(1, 2, None, 2.0)).await;

    assert_eq!(outcome.count(), 8);
    assert_eq!(outcome.pages_attempted, 2);
    assert_eq!(outcome.termination, TerminationReason::RangeExhausted);
    assert_eq!(fetcher.calls(), vec![1, 2]);
    // page order, then within-page order
    assert_eq!(
        outcome.items,
        vec![100, 101, 102, 103, 104, 200, 201, 202]
    );
}

#[tokio::test(start_paused = true)]
async fn test_limit_truncates_first_page_and_skips_the_rest() {
    let fetcher = Arc::new(ScriptedFetcher::new().items(1, 5).items(2, 3));
    let outcome = run(&fetcher, &request(1, 2, Some(4), 2.0)).await;

    assert_eq!(outcome.items, vec![100, 101, 102, 103]);
    assert_eq!(outcome.pages_attempted, 1);
    assert_eq!(outcome.termination, TerminationReason::LimitReached);
    assert_eq!(fetcher.calls(), vec![1]);
}

#[tokio::test(start_paused = true)]
async fn test_limit_spanning_pages() {
    let fetcher = Arc::new(ScriptedFetcher::new().items(1, 5).items(2, 5).items(3, 5));
    let outcome = run(&fetcher, &request(1, 3, Some(7), 0.0)).await;

    assert_eq!(outcome.items, vec![100, 101, 102, 103, 104, 200, 201]);
    assert_eq!(outcome.pages_attempted, 2);
    assert_eq!(outcome.termination, TerminationReason::LimitReached);
}

#[tokio::test(start_paused = true)]
async fn test_limit_equal_to_total_reports_limit_reached() {
    let fetcher = Arc::new(ScriptedFetcher::new().items(1, 3));
    let outcome = run(&fetcher, &request(1, 1, Some(3), 0.0)).await;

    assert_eq!(outcome.count(), 3);
    assert_eq!(outcome.termination, TerminationReason::LimitReached);
}

#[tokio::test(start_paused = true)]
async fn test_empty_first_page() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    let outcome = run(&fetcher, &request(1, 3, None, 2.0)).await;

    assert!(outcome.items.is_empty());
    assert_eq!(outcome.pages_attempted, 1);
    assert_eq!(outcome.termination, TerminationReason::EmptyPage);
    assert_eq!(fetcher.calls(), vec![1]);
}

#[tokio::test(start_paused = true)]
async fn test_empty_page_stops_before_later_pages() {
    // page 3 has results but is never reached
    let fetcher = Arc::new(ScriptedFetcher::new().items(1, 2).items(3, 2));
    let outcome = run(&fetcher, &request(1, 3, None, 0.0)).await;

    assert_eq!(outcome.items, vec![100, 101]);
    assert_eq!(outcome.pages_attempted, 2);
    assert_eq!(outcome.termination, TerminationReason::EmptyPage);
    assert_eq!(fetcher.calls(), vec![1, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_error_keeps_earlier_pages() {
    let fetcher = Arc::new(ScriptedFetcher::new().items(1, 5).page(2, Script::Fail).items(3, 5));
    let outcome = run(&fetcher, &request(1, 3, None, 1.0)).await;

    assert_eq!(outcome.count(), 5);
    assert_eq!(outcome.pages_attempted, 2);
    assert_eq!(outcome.termination, TerminationReason::FetchError);
    assert_eq!(fetcher.calls(), vec![1, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_error_on_first_page() {
    let fetcher = Arc::new(ScriptedFetcher::new().page(1, Script::Fail));
    let outcome = run(&fetcher, &request(1, 2, None, 1.0)).await;

    assert!(outcome.items.is_empty());
    assert_eq!(outcome.pages_attempted, 1);
    assert_eq!(outcome.termination, TerminationReason::FetchError);
}

#[tokio::test(start_paused = true)]
async fn test_zero_limit_fetches_nothing() {
    let fetcher = Arc::new(ScriptedFetcher::new().items(1, 5));
    let outcome = run(&fetcher, &request(1, 5, Some(0), 2.0)).await;

    assert!(outcome.items.is_empty());
    assert_eq!(outcome.pages_attempted, 0);
    assert_eq!(outcome.termination, TerminationReason::LimitReached);
    assert!(fetcher.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_range_starts_at_requested_page() {
    let fetcher = Arc::new(ScriptedFetcher::new().items(4, 1).items(5, 1).items(6, 1));
    let outcome = run(&fetcher, &request(4, 2, None, 0.0)).await;

    assert_eq!(outcome.items, vec![400, 500]);
    assert_eq!(outcome.pages_attempted, 2);
    assert_eq!(fetcher.calls(), vec![4, 5]);
}

#[tokio::test(start_paused = true)]
async fn test_single_page_never_waits() {
    let fetcher = Arc::new(ScriptedFetcher::new().items(1, 3));
    let start = Instant::now();
    let outcome = run(&fetcher, &request(1, 1, None, 30.0)).await;

    assert_eq!(outcome.pages_attempted, 1);
    assert_eq!(outcome.termination, TerminationReason::RangeExhausted);
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_waits_only_between_attempted_pages() {
    let fetcher = Arc::new(ScriptedFetcher::new().items(1, 1).items(2, 1).items(3, 1));
    let start = Instant::now();
    let outcome = run(&fetcher, &request(1, 3, None, 1.5)).await;
    let elapsed = start.elapsed();

    assert_eq!(outcome.pages_attempted, 3);
    // two waits for three pages, none after the last
    assert!(elapsed >= Duration::from_millis(3000), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(4500), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_no_wait_after_empty_page() {
    let fetcher = Arc::new(ScriptedFetcher::new().items(1, 1));
    let start = Instant::now();
    let outcome = run(&fetcher, &request(1, 5, None, 10.0)).await;

    assert_eq!(outcome.pages_attempted, 2);
    assert_eq!(outcome.termination, TerminationReason::EmptyPage);
    // one wait between page 1 and page 2, none after the empty page
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(10) && elapsed < Duration::from_secs(20));
}

#[tokio::test(start_paused = true)]
async fn test_pages_attempted_never_exceeds_page_count() {
    for page_count in 1..=4 {
        let mut fetcher = ScriptedFetcher::new();
        for page in 1..=10 {
            fetcher = fetcher.items(page, 2);
        }
        let fetcher = Arc::new(fetcher);
        let outcome = run(&fetcher, &request(1, page_count, None, 0.0)).await;

        assert_eq!(outcome.pages_attempted, page_count);
        assert_eq!(outcome.count(), 2 * page_count as usize);
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_before_start() {
    let fetcher = Arc::new(ScriptedFetcher::new().items(1, 3));
    let cancel = CancellationToken::new();
    cancel.cancel();
    let outcome = PageOrchestrator::new(fetcher.clone())
        .run(&request(1, 3, None, 0.0), &cancel)
        .await;

    assert!(outcome.items.is_empty());
    assert_eq!(outcome.pages_attempted, 0);
    assert_eq!(outcome.termination, TerminationReason::Cancelled);
    assert!(fetcher.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_interrupts_pacing_wait() {
    let fetcher = Arc::new(ScriptedFetcher::new().items(1, 3).items(2, 3));
    let cancel = CancellationToken::new();
    let orchestrator = PageOrchestrator::new(fetcher.clone());
    let req = request(1, 2, None, 60.0);
    let task_cancel = cancel.clone();
    let start = Instant::now();
    let handle = tokio::spawn(async move { orchestrator.run(&req, &task_cancel).await });

    tokio::time::sleep(Duration::from_secs(1)).await;
    cancel.cancel();
    let outcome = handle.await.unwrap();

    assert_eq!(outcome.items, vec![100, 101, 102]);
    assert_eq!(outcome.pages_attempted, 1);
    assert_eq!(outcome.termination, TerminationReason::Cancelled);
    assert_eq!(fetcher.calls(), vec![1]);
    assert!(start.elapsed() < Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_interrupts_in_flight_fetch() {
    let fetcher = Arc::new(ScriptedFetcher::new().items(1, 2).page(2, Script::Hang));
    let cancel = CancellationToken::new();
    let orchestrator = PageOrchestrator::new(fetcher.clone());
    let req = request(1, 3, None, 0.0);
    let task_cancel = cancel.clone();
    let handle = tokio::spawn(async move { orchestrator.run(&req, &task_cancel).await });

    tokio::time::sleep(Duration::from_secs(5)).await;
    cancel.cancel();
    let outcome = handle.await.unwrap();

    assert_eq!(outcome.items, vec![100, 101]);
    assert_eq!(outcome.pages_attempted, 2);
    assert_eq!(outcome.termination, TerminationReason::Cancelled);
}

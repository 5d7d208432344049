use axum::{
    Json,
    extract::{Query, State},
};
use nanoid::nanoid;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::assembler::{SearchReply, assemble};
use crate::data_models::NewsItem;
use crate::errors::SEARCH_EXAMPLE;
use crate::validator::validate;

use super::AppState;
use super::models::ApiError;

pub async fn search_handler(
    State(state): State<AppState>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<SearchReply<NewsItem>>, ApiError> {
    let request = validate(&raw)?;
    let request_id = nanoid!(10);
    let start = Instant::now();
    log::info!("[{request_id}] processing search: {request:?}");

    let cancel = CancellationToken::new();
    // if the client goes away this handler is dropped and the run stops
    let _guard = cancel.clone().drop_guard();

    let orchestrator = state.orchestrator.clone();
    let task_request = request.clone();
    let task_cancel = cancel.clone();
    let mut handle =
        tokio::spawn(async move { orchestrator.run(&task_request, &task_cancel).await });

    let joined = tokio::select! {
        joined = &mut handle => joined,
        _ = tokio::time::sleep(state.search_deadline) => {
            log::warn!(
                "[{request_id}] search exceeded {:?}, returning partial results",
                state.search_deadline
            );
            cancel.cancel();
            handle.await
        }
    };
    let outcome = joined.map_err(|e| {
        log::error!("[{request_id}] search task failed: {e}");
        ApiError::internal("internal error", e)
    })?;

    log::info!(
        "[{request_id}] done in {}ms: {} items, {} pages, {:?}",
        start.elapsed().as_millis(),
        outcome.items.len(),
        outcome.pages_attempted,
        outcome.termination
    );

    Ok(Json(assemble(&request, outcome)))
}

pub async fn home_handler() -> Json<Value> {
    Json(json!({
        "status": 200,
        "message": "Detik News Scraper API",
        "endpoints": {
            "/search": {
                "description": "Search Detik news across one or more result pages",
                "parameters": {
                    "q": "Search keywords (required)",
                    "page": "First page to scrape (default: 1)",
                    "pages": "Number of pages to scrape (default: 1)",
                    "detail": "Fetch full article content (true/false, default: false)",
                    "limit": "Maximum number of results (default: unlimited)",
                    "delay": "Seconds to wait between page requests (default: 2.0)"
                },
                "example": SEARCH_EXAMPLE
            }
        }
    }))
}

pub async fn not_found_handler() -> ApiError {
    ApiError::NotFound
}

use axum::{Router, routing::get};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::data_models::NewsItem;
use crate::fetcher::PageFetcher;
use crate::orchestrator::PageOrchestrator;

pub mod handlers;
pub mod models;

pub type NewsFetcher = dyn PageFetcher<Item = NewsItem>;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: PageOrchestrator<NewsFetcher>,
    pub search_deadline: Duration,
}

impl AppState {
    pub fn new(fetcher: Arc<NewsFetcher>, search_deadline: Duration) -> AppState {
        AppState {
            orchestrator: PageOrchestrator::new(fetcher),
            search_deadline,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::home_handler))
        .route("/search", get(handlers::search_handler))
        .fallback(handlers::not_found_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

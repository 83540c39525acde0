//! HTTP surface and console for the waterwatch query service.

pub mod console;
pub mod http;

use axum::routing::{get, post};
use axum::Router;
use chrono::NaiveDate;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use waterwatch_core::QueryService;

/// Header carrying the conversation identity.
pub const CONVERSATION_HEADER: &str = "x-conversation-id";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<QueryService>,
    /// Fixed "today" for requests that name no date. `None` uses the clock.
    pub today: Option<NaiveDate>,
}

impl AppState {
    pub fn new(service: Arc<QueryService>) -> Self {
        Self {
            service,
            today: None,
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(http::healthz_handler))
        .route("/api/query", post(http::query_handler))
        .route(
            "/api/provinces/:province/districts/:name/status",
            get(http::district_status_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

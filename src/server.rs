use crate::collectors::{timed_collect, Collector};
use crate::metrics::{render, OPENMETRICS_CONTENT_TYPE};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub collector: Arc<dyn Collector>,
}

pub fn build_router(collector: Arc<dyn Collector>) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/health", get(|| async { "ok" }))
        .with_state(AppState { collector })
}

/// One scrape per request. Device failures show up in `ratgdo_up`, not in
/// the HTTP status.
async fn metrics(State(state): State<AppState>) -> Response {
    let samples = timed_collect(state.collector.as_ref()).await;

    match render(&state.collector.describe(), &samples) {
        Ok(body) => ([(header::CONTENT_TYPE, OPENMETRICS_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

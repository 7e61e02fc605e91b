//! Route matching middleware.
//! Attaches the matched route and the runtime snapshot it came from to the
//! request, and records request metrics.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::http::server::{AppState, Runtime};
use crate::observability::metrics;

/// The runtime a request was matched against. Later middleware reads this
/// one, never the live runtime.
#[derive(Debug, Clone)]
pub struct RuntimeSnapshot(pub Arc<Runtime>);

pub async fn route_match_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();

    let runtime = state.runtime();
    match runtime.router.match_request(&req) {
        Some(matched) => {
            tracing::debug!(route = %matched.name, path = %req.uri().path(), "Route matched");
            req.extensions_mut().insert(matched);
        }
        None => {
            tracing::debug!(path = %req.uri().path(), "No route matched");
        }
    }
    req.extensions_mut().insert(RuntimeSnapshot(runtime));

    let response = next.run(req).await;
    metrics::record_request(&method, response.status().as_u16(), start);
    response
}

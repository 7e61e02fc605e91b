//! Feature gate middleware.
//! Rejected requests get the same answer as an unknown route. The gate comes
//! from the runtime snapshot attached during route matching, so matching and
//! gating always see the same configuration.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::http::middleware::route_match::RuntimeSnapshot;
use crate::http::server::{not_found, AppState};
use crate::observability::metrics;
use crate::security::feature_gate::{Decision, Rejection};

pub async fn feature_gate_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let runtime = match req.extensions().get::<RuntimeSnapshot>() {
        Some(RuntimeSnapshot(runtime)) => runtime.clone(),
        None => state.runtime(),
    };
    match runtime.gate.evaluate(&req) {
        Decision::Allow => next.run(req).await,
        Decision::Reject(Rejection::NotFound) => {
            metrics::record_rejected();
            not_found()
        }
    }
}

//! Request identification.
//!
//! # Responsibilities
//! - Ensure every request carries an `x-request-id` header
//! - Expose the ID as a request extension for handlers and spans
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A client-supplied ID is kept, so IDs can span several hops

use std::task::{Context, Poll};

use axum::http::{HeaderName, HeaderValue, Request};
use tower::{Layer, Service};
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Identifier of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

pub trait RequestIdExt {
    fn request_id(&self) -> Option<&RequestId>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }
}

/// Layer adding [`RequestId`] to every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let existing = req
            .headers()
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        let id = match existing {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                if let Ok(value) = HeaderValue::from_str(&id) {
                    req.headers_mut().insert(X_REQUEST_ID, value);
                }
                id
            }
        };

        req.extensions_mut().insert(RequestId(id));
        self.inner.call(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use std::convert::Infallible;
    use tower::{service_fn, ServiceExt};

    async fn echo_id(req: Request<Body>) -> Result<Option<String>, Infallible> {
        let header = req
            .headers()
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        assert_eq!(header.as_deref(), req.request_id().map(|id| id.0.as_str()));
        Ok(header)
    }

    #[tokio::test]
    async fn test_generates_id() {
        let service = RequestIdLayer.layer(service_fn(echo_id));
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();

        let id = service.oneshot(req).await.unwrap().unwrap();
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[tokio::test]
    async fn test_keeps_client_id() {
        let service = RequestIdLayer.layer(service_fn(echo_id));
        let req = Request::builder()
            .uri("/")
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();

        let id = service.oneshot(req).await.unwrap();
        assert_eq!(id.as_deref(), Some("abc-123"));
    }
}

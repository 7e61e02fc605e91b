//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the runtime (route table + feature gate) from configuration
//! - Create the Axum router with all middleware
//! - Bind server to listener, stop on shutdown signal
//! - Swap in a rebuilt runtime on every config update
//!
//! # Design Decisions
//! - The runtime lives behind `ArcSwap`; requests never wait on a reload
//! - A failed rebuild keeps the previous runtime
//! - Listener and timeouts are fixed at startup; reloads only affect routes,
//!   channels, firewalls and features

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GateConfig;
use crate::http::middleware::{feature_gate_middleware, route_match_middleware};
use crate::http::request::{RequestIdLayer, X_REQUEST_ID};
use crate::observability::metrics;
use crate::routing::loader::{default_loader, LoadError};
use crate::routing::route::Resource;
use crate::routing::router::{MatchedRoute, Router};
use crate::routing::RouteCollectionBuilder;
use crate::security::channel::{Channel, HostnameChannelContext};
use crate::security::feature_gate::RequestFeatureGate;
use crate::security::firewall::FirewallMap;
use crate::security::settings::InMemorySettings;

/// Everything a request needs, rebuilt as a unit on reload.
#[derive(Debug)]
pub struct Runtime {
    pub router: Router,
    pub gate: RequestFeatureGate,
    pub resources: Vec<Resource>,
}

impl Runtime {
    /// Import all configured route resources and assemble the feature gate.
    pub fn build(config: &GateConfig) -> Result<Self, LoadError> {
        let loader = default_loader(&config.routing.resource_dir);
        let mut builder =
            RouteCollectionBuilder::new(Arc::new(config.features.clone()), Some(Arc::new(loader)));

        for import in &config.routing.imports {
            builder.import(&import.resource, &import.prefix, import.kind.as_deref())?;
        }

        let routes = builder.build();
        let resources = routes.resources().to_vec();
        let router = Router::from_collection(routes);
        metrics::record_route_table(router.len(), router.suppressed_count());

        let channels = HostnameChannelContext::new(
            config.channels.iter().map(Channel::from).collect(),
            config.feature_gate.default_channel.clone(),
        );
        let gate = RequestFeatureGate::new(
            Arc::new(channels),
            Arc::new(InMemorySettings::from_config(config)),
            Arc::new(FirewallMap::from_configs(&config.firewalls)),
        );

        tracing::info!(
            routes = router.len(),
            suppressed = router.suppressed_count(),
            channels = config.channels.len(),
            firewalls = config.firewalls.len(),
            "Runtime built"
        );

        Ok(Self {
            router,
            gate,
            resources,
        })
    }
}

/// Application state injected into middleware.
#[derive(Clone)]
pub struct AppState {
    runtime: Arc<ArcSwap<Runtime>>,
}

impl AppState {
    pub fn new(runtime: Runtime) -> Self {
        Self {
            runtime: Arc::new(ArcSwap::from_pointee(runtime)),
        }
    }

    /// Snapshot of the current runtime.
    pub fn runtime(&self) -> Arc<Runtime> {
        self.runtime.load_full()
    }

    pub fn replace(&self, runtime: Runtime) {
        self.runtime.store(Arc::new(runtime));
    }
}

/// The response for unknown, suppressed and rejected routes alike.
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Route not found").into_response()
}

/// Terminal handler: report the matched route.
async fn dispatch(req: Request<Body>) -> Response {
    match req.extensions().get::<MatchedRoute>() {
        Some(matched) => Json(json!({
            "route": matched.name,
            "params": matched.params,
        }))
        .into_response(),
        None => not_found(),
    }
}

/// HTTP server hosting the filtered route table.
pub struct HttpServer {
    router: axum::Router,
    state: AppState,
    config: GateConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GateConfig) -> Result<Self, LoadError> {
        let state = AppState::new(Runtime::build(&config)?);
        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            state,
            config,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GateConfig, state: AppState) -> axum::Router {
        axum::Router::new()
            .fallback(dispatch)
            .layer(middleware::from_fn_with_state(state.clone(), feature_gate_middleware))
            .layer(middleware::from_fn_with_state(state.clone(), route_match_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                let request_id = req
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    path = %req.uri().path(),
                    request_id = %request_id,
                )
            }))
            .layer(RequestIdLayer)
            .with_state(state)
    }

    /// The Axum router, for in-process use (tests, embedding).
    pub fn router(&self) -> axum::Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Files and directories the current route table was built from.
    pub fn resources(&self) -> Vec<Resource> {
        self.state.runtime().resources.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GateConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let state = self.state.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                match Runtime::build(&config) {
                    Ok(runtime) => {
                        state.replace(runtime);
                        tracing::info!("Configuration reloaded");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to rebuild routes. Keeping current configuration.");
                    }
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChannelConfig, FirewallConfig, RouteImportConfig};
    use crate::http::middleware::RuntimeSnapshot;
    use std::collections::BTreeMap;
    use tower::ServiceExt;

    fn config(dir: &std::path::Path) -> GateConfig {
        std::fs::write(
            dir.join("shop.toml"),
            r#"
            [[routes]]
            name = "sylius_shop_homepage"
            path = "/"

            [[routes]]
            name = "sylius_shop_checkout_start"
            path = "/checkout"

            [[routes]]
            name = "_profiler"
            path = "/_profiler/{token}"
            "#,
        )
        .unwrap();

        let mut config = GateConfig::default();
        config.routing.resource_dir = dir.to_string_lossy().into_owned();
        config.routing.imports.push(RouteImportConfig {
            resource: "shop.toml".into(),
            prefix: "/".into(),
            kind: None,
        });
        config.channels.push(ChannelConfig {
            code: "WEB".into(),
            hostnames: vec!["shop.example.com".into()],
            disabled_firewall_contexts: None,
        });
        config.firewalls.push(FirewallConfig {
            name: "shop".into(),
            path_prefix: Some("/".into()),
            host: None,
            context: None,
        });
        config
    }

    async fn status(router: &axum::Router, uri: &str) -> StatusCode {
        let req = Request::builder()
            .uri(uri)
            .header("Host", "shop.example.com")
            .body(Body::empty())
            .unwrap();
        router.clone().oneshot(req).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_suppressed_route_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let server = HttpServer::new(config(dir.path())).unwrap();
        let router = server.router();

        assert_eq!(status(&router, "/").await, StatusCode::OK);
        assert_eq!(status(&router, "/checkout").await, StatusCode::NOT_FOUND);
        assert_eq!(status(&router, "/nowhere").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_disabled_context_rejected_except_profiler() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.channels[0].disabled_firewall_contexts = Some(vec!["shop".into()]);
        let server = HttpServer::new(config).unwrap();
        let router = server.router();

        assert_eq!(status(&router, "/").await, StatusCode::NOT_FOUND);
        assert_eq!(status(&router, "/_profiler/abc123").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_replace_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        let server = HttpServer::new(config.clone()).unwrap();
        let router = server.router();
        assert_eq!(status(&router, "/").await, StatusCode::OK);

        config.channels[0].disabled_firewall_contexts = Some(vec!["shop".into()]);
        server.state().replace(Runtime::build(&config).unwrap());
        assert_eq!(status(&router, "/").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_gate_uses_snapshot_from_route_matching() {
        let dir = tempfile::tempdir().unwrap();
        let allowing = config(dir.path());
        let mut rejecting = allowing.clone();
        rejecting.channels[0].disabled_firewall_contexts = Some(vec!["shop".into()]);

        // Live runtime rejects, the snapshot taken at match time allows.
        let state = AppState::new(Runtime::build(&rejecting).unwrap());
        let router = axum::Router::new()
            .fallback(dispatch)
            .layer(middleware::from_fn_with_state(state.clone(), feature_gate_middleware))
            .with_state(state);

        let request = |snapshot: Option<Runtime>| {
            let mut req = Request::builder()
                .uri("/")
                .header("Host", "shop.example.com")
                .body(Body::empty())
                .unwrap();
            req.extensions_mut().insert(MatchedRoute {
                name: "sylius_shop_homepage".into(),
                params: BTreeMap::new(),
            });
            if let Some(runtime) = snapshot {
                req.extensions_mut().insert(RuntimeSnapshot(Arc::new(runtime)));
            }
            req
        };

        let with_snapshot = request(Some(Runtime::build(&allowing).unwrap()));
        assert_eq!(router.clone().oneshot(with_snapshot).await.unwrap().status(), StatusCode::OK);

        let without_snapshot = request(None);
        assert_eq!(
            router.clone().oneshot(without_snapshot).await.unwrap().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_missing_route_file_fails_startup() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.routing.imports[0].resource = "missing.toml".into();
        assert!(matches!(HttpServer::new(config), Err(LoadError::Io { .. })));
    }
}

//! Storefront route gate.
//!
//! Disables storefront feature groups (checkout, payments, customers, ...)
//! by making their routes unreachable, and rejects requests addressed to
//! firewall contexts a sales channel has switched off.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::GateConfig;
pub use http::{HttpServer, Runtime};
pub use lifecycle::Shutdown;
pub use routing::{RouteCollectionBuilder, RouteSuppressionEngine};
pub use security::RequestFeatureGate;

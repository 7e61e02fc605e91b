//! HTTP hosting subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → request.rs (request ID)
//!     → trace + timeout layers
//!     → middleware/route_match.rs (route lookup, metrics)
//!     → middleware/feature_gate.rs (reject disabled contexts as not found)
//!     → server.rs dispatch (matched route as JSON, else 404)
//! ```

pub mod middleware;
pub mod request;
pub mod server;

pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::{AppState, HttpServer, Runtime};

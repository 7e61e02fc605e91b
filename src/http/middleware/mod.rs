//! Request middleware: route matching and the feature gate.

pub mod feature_gate;
pub mod route_match;

pub use feature_gate::feature_gate_middleware;
pub use route_match::{route_match_middleware, RuntimeSnapshot};

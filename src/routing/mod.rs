//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Table Construction (at startup / reload):
//!     [[routing.imports]]
//!     → loader.rs (TOML files, directories, resolver fallback)
//!     → groups.rs (policy → suppression list)
//!     → suppression.rs (disable matching routes)
//!     → builder.rs (prefix, mount, flatten)
//!     → router.rs (compile, freeze)
//!
//! Incoming Request (method, path, headers)
//!     → router.rs (route lookup)
//!     → matcher.rs (evaluate path and conditions)
//!     → Return: MatchedRoute or NoMatch
//! ```
//!
//! # Design Decisions
//! - Routes compiled at build time, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always matches same route
//! - First match wins (collection order)

pub mod builder;
pub mod groups;
pub mod loader;
pub mod matcher;
pub mod route;
pub mod router;
pub mod suppression;

pub use builder::RouteCollectionBuilder;
pub use groups::{compute_active_suppression_list, FeatureGroup, FeaturePolicy, SuppressionList};
pub use loader::{LoadError, RouteLoader};
pub use route::{Condition, Resource, Route, RouteCollection};
pub use router::{MatchedRoute, Router};
pub use suppression::{suppress, RouteSuppressionEngine};

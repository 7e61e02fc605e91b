//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//!     → route table + feature gate built from it
//!
//! On change of the config file or a route resource:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server rebuilds and atomically swaps its runtime
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ChannelConfig, FeatureGateConfig, FeaturesConfig, FirewallConfig, GateConfig, ListenerConfig,
    LogFormat, ObservabilityConfig, RouteImportConfig, RoutingConfig, TimeoutConfig,
};
pub use watcher::ConfigWatcher;

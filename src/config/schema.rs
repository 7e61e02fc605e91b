//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::groups::FeaturePolicy;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Which optional storefront features the installation allows.
    pub features: FeaturesConfig,

    /// Route resources to import.
    pub routing: RoutingConfig,

    /// Sales channels.
    pub channels: Vec<ChannelConfig>,

    /// Feature gate defaults.
    pub feature_gate: FeatureGateConfig,

    /// Firewalls, checked in order.
    pub firewalls: Vec<FirewallConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Feature switches. Everything else in the route group table stays
/// disabled regardless.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FeaturesConfig {
    pub customers_allowed: bool,
    pub zones_allowed: bool,
    pub countries_allowed: bool,
}

impl FeaturePolicy for FeaturesConfig {
    fn are_customers_allowed(&self) -> bool {
        self.customers_allowed
    }

    fn are_zones_allowed(&self) -> bool {
        self.zones_allowed
    }

    fn are_countries_allowed(&self) -> bool {
        self.countries_allowed
    }
}

/// Routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Directory relative resources resolve against. Relative to the config
    /// file when loaded from disk.
    pub resource_dir: String,

    pub imports: Vec<RouteImportConfig>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            resource_dir: ".".to_string(),
            imports: Vec::new(),
        }
    }
}

/// A single `[[routing.imports]]` entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteImportConfig {
    /// File or directory, relative to `resource_dir`.
    pub resource: String,

    /// Path prefix for every imported route.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Loader type (`toml`, `directory`). Guessed from the resource if unset.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

fn default_prefix() -> String {
    "/".to_string()
}

/// Sales channel definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChannelConfig {
    /// Unique channel code.
    pub code: String,

    /// Hostnames served by this channel.
    #[serde(default)]
    pub hostnames: Vec<String>,

    /// Firewall contexts rejected on this channel.
    #[serde(default)]
    pub disabled_firewall_contexts: Option<Vec<String>>,
}

/// Feature gate defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FeatureGateConfig {
    /// Channel used when no hostname matches.
    pub default_channel: Option<String>,

    /// Contexts disabled on channels that do not set their own list.
    pub disabled_firewall_contexts: Option<Vec<String>>,
}

/// Firewall definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FirewallConfig {
    /// Unique firewall name.
    pub name: String,

    /// Path prefix to match. Unset matches every path.
    #[serde(default)]
    pub path_prefix: Option<String>,

    /// Host to match. Unset matches every host.
    #[serde(default)]
    pub host: Option<String>,

    /// Shared context label; used instead of the name when set.
    #[serde(default)]
    pub context: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

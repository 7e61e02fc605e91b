//! Security subsystem: the request-time feature gate and its collaborators.
//!
//! # Data Flow
//! ```text
//! Incoming request (after route matching):
//!     → channel.rs (which storefront?)
//!     → settings.rs (disabled firewall contexts for that channel)
//!     → firewall.rs (security context of the request)
//!     → feature_gate.rs (Allow / Reject as not found)
//! ```
//!
//! # Design Decisions
//! - Fail open when no channel is active
//! - Rejections are indistinguishable from unknown routes
//! - No authentication here; only the context name is consumed

pub mod channel;
pub mod feature_gate;
pub mod firewall;
pub mod settings;

pub use channel::{Channel, ChannelContext, ChannelNotFound, HostnameChannelContext};
pub use feature_gate::{Decision, Rejection, RequestFeatureGate, RequestType, PROFILER_ROUTES};
pub use firewall::{Firewall, FirewallMap, FirewallResolver};
pub use settings::{InMemorySettings, SettingsProvider, DISABLED_FIREWALL_CONTEXTS};

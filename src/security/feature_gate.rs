//! Request-time feature gate.
//!
//! # Data Flow
//! ```text
//! Request
//!     → sub-request or profiler route?  → Allow
//!     → channel context                 → ChannelNotFound → Allow
//!     → settings: disabled contexts for the channel
//!     → firewall map: context name of the request
//!     → name disabled?                  → Reject(NotFound) / Allow
//! ```
//!
//! # Design Decisions
//! - Fail open without a channel (console, health probes, ...)
//! - Rejections look like a missing route; never "forbidden"
//! - Stateless: every evaluation reads the collaborators afresh

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;

use crate::routing::router::MatchedRoute;
use crate::security::channel::ChannelContext;
use crate::security::firewall::{firewall_context_name, FirewallResolver};
use crate::security::settings::{disabled_firewall_contexts, SettingsProvider};

/// Diagnostic routes that are always reachable.
pub const PROFILER_ROUTES: [&str; 4] = ["_wdt", "_profiler", "_profiler_search", "_profiler_search_results"];

/// Whether a request comes from the client or from an internal include.
///
/// Attached as a request extension; requests without it are main requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestType {
    #[default]
    Main,
    Sub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Reject(Rejection),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Rejects requests whose firewall context the current channel disables.
#[derive(Clone)]
pub struct RequestFeatureGate {
    channels: Arc<dyn ChannelContext>,
    settings: Arc<dyn SettingsProvider>,
    firewalls: Arc<dyn FirewallResolver>,
}

impl RequestFeatureGate {
    pub fn new(
        channels: Arc<dyn ChannelContext>,
        settings: Arc<dyn SettingsProvider>,
        firewalls: Arc<dyn FirewallResolver>,
    ) -> Self {
        Self {
            channels,
            settings,
            firewalls,
        }
    }

    fn can_check(req: &Request<Body>) -> bool {
        let is_main = req
            .extensions()
            .get::<RequestType>()
            .copied()
            .unwrap_or_default()
            == RequestType::Main;

        let is_profiler = req
            .extensions()
            .get::<MatchedRoute>()
            .is_some_and(|route| PROFILER_ROUTES.contains(&route.name.as_str()));

        is_main && !is_profiler
    }

    pub fn evaluate(&self, req: &Request<Body>) -> Decision {
        if !Self::can_check(req) {
            return Decision::Allow;
        }

        let channel = match self.channels.channel(req) {
            Ok(channel) => channel,
            Err(_) => return Decision::Allow,
        };

        let disabled = disabled_firewall_contexts(self.settings.as_ref(), &channel);
        if disabled.is_empty() {
            return Decision::Allow;
        }

        let context = firewall_context_name(self.firewalls.as_ref(), req);
        if disabled.iter().any(|name| *name == context) {
            tracing::debug!(
                channel = %channel.code,
                context = %context,
                path = %req.uri().path(),
                "Request rejected by feature gate"
            );
            return Decision::Reject(Rejection::NotFound);
        }

        Decision::Allow
    }
}

impl std::fmt::Debug for RequestFeatureGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestFeatureGate").finish_non_exhaustive()
    }
}

//! Firewall map: which security context a request belongs to.
//!
//! # Design Decisions
//! - Firewalls are checked in declaration order; first match wins
//! - A firewall without path prefix and host matches everything
//! - The context label, when set, takes precedence over the firewall name

use axum::body::Body;
use axum::http::Request;
use serde::Serialize;

use crate::config::FirewallConfig;
use crate::routing::matcher::{AndMatcher, HostMatcher, Matcher, PathPrefixMatcher};

/// A named security zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Firewall {
    pub name: String,
    pub context: Option<String>,
}

impl Firewall {
    /// Name used when checking disabled contexts.
    pub fn context_name(&self) -> &str {
        self.context.as_deref().unwrap_or(&self.name)
    }
}

/// Finds the firewall configuration for a request.
pub trait FirewallResolver: Send + Sync {
    fn config_for(&self, req: &Request<Body>) -> Option<&Firewall>;
}

/// Ordered firewall list compiled from configuration.
#[derive(Debug, Default)]
pub struct FirewallMap {
    firewalls: Vec<(AndMatcher, Firewall)>,
}

impl FirewallMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_configs(configs: &[FirewallConfig]) -> Self {
        let mut map = Self::new();
        for config in configs {
            map.add(
                config.path_prefix.as_deref(),
                config.host.as_deref(),
                Firewall {
                    name: config.name.clone(),
                    context: config.context.clone(),
                },
            );
        }
        map
    }

    pub fn add(&mut self, path_prefix: Option<&str>, host: Option<&str>, firewall: Firewall) {
        let mut matchers: Vec<Box<dyn Matcher>> = Vec::new();
        if let Some(prefix) = path_prefix {
            matchers.push(Box::new(PathPrefixMatcher::new(prefix)));
        }
        if let Some(host) = host {
            matchers.push(Box::new(HostMatcher::new(host)));
        }
        self.firewalls.push((AndMatcher::new(matchers), firewall));
    }

    pub fn len(&self) -> usize {
        self.firewalls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.firewalls.is_empty()
    }
}

impl FirewallResolver for FirewallMap {
    fn config_for(&self, req: &Request<Body>) -> Option<&Firewall> {
        self.firewalls
            .iter()
            .find(|(matcher, _)| matcher.matches(req))
            .map(|(_, firewall)| firewall)
    }
}

/// Context name of the request's firewall, or an empty string.
pub fn firewall_context_name(resolver: &dyn FirewallResolver, req: &Request<Body>) -> String {
    resolver
        .config_for(req)
        .map(|firewall| firewall.context_name().to_string())
        .unwrap_or_default()
}

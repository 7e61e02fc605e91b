//! Route suppression.
//!
//! Walks a route collection and makes every route whose name contains a
//! suppressed fragment unreachable. Membership, order and resources are kept.

use crate::routing::groups::{compute_active_suppression_list, FeaturePolicy, SuppressionList};
use crate::routing::route::RouteCollection;

/// Suppress every route whose name contains a fragment of `list`.
pub fn suppress(mut routes: RouteCollection, list: &SuppressionList) -> RouteCollection {
    let mut suppressed = 0usize;

    for (name, route) in routes.iter_mut() {
        if let Some(fragment) = list.find_match(name) {
            route.suppress();
            suppressed += 1;
            tracing::debug!(route = %name, fragment = %fragment, "Route suppressed");
        }
    }

    tracing::debug!(total = routes.len(), suppressed, "Suppression applied");
    routes
}

/// Suppression list bound to a policy snapshot.
#[derive(Debug, Clone)]
pub struct RouteSuppressionEngine {
    list: SuppressionList,
}

impl RouteSuppressionEngine {
    pub fn from_policy(policy: &dyn FeaturePolicy) -> Self {
        Self {
            list: compute_active_suppression_list(policy),
        }
    }

    pub fn with_list(list: SuppressionList) -> Self {
        Self { list }
    }

    pub fn list(&self) -> &SuppressionList {
        &self.list
    }

    pub fn suppress(&self, routes: RouteCollection) -> RouteCollection {
        suppress(routes, &self.list)
    }
}

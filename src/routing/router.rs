//! Route lookup.
//!
//! # Responsibilities
//! - Compile a route collection into path matchers
//! - Look up the matching route for a request
//! - Return the matched route or an explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in collection order; first match wins
//! - Suppressed routes stay compiled but their condition never holds,
//!   so they fall through to "not found"

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::Request;
use serde::Serialize;

use crate::routing::matcher::PathPatternMatcher;
use crate::routing::route::{Route, RouteCollection};

/// Route name and captured parameters, attached to requests as an extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedRoute {
    pub name: String,
    pub params: BTreeMap<String, String>,
}

#[derive(Debug)]
struct CompiledRoute {
    name: String,
    route: Route,
    matcher: PathPatternMatcher,
}

/// Immutable route table used at request time.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<CompiledRoute>,
}

impl Router {
    pub fn from_collection(collection: RouteCollection) -> Self {
        let routes = collection
            .into_iter()
            .map(|(name, route)| CompiledRoute {
                matcher: PathPatternMatcher::new(&route.path),
                name,
                route,
            })
            .collect();

        Self { routes }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Number of routes that can never match.
    pub fn suppressed_count(&self) -> usize {
        self.routes
            .iter()
            .filter(|compiled| !compiled.route.is_reachable())
            .count()
    }

    pub fn routes(&self) -> impl Iterator<Item = (&str, &Route)> {
        self.routes
            .iter()
            .map(|compiled| (compiled.name.as_str(), &compiled.route))
    }

    /// Find the first route matching the request.
    pub fn match_request(&self, req: &Request<Body>) -> Option<MatchedRoute> {
        let method = req.method().as_str();
        let path = req.uri().path();

        self.routes.iter().find_map(|compiled| {
            if !compiled.route.allows_method(method) {
                return None;
            }
            let params = compiled.matcher.captures(path)?;
            if !compiled.route.condition.evaluate(req) {
                return None;
            }
            Some(MatchedRoute {
                name: compiled.name.clone(),
                params,
            })
        })
    }
}

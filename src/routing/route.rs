//! Route definitions and ordered route collections.
//!
//! # Design Decisions
//! - Suppressing a route never removes it; it only swaps in a condition that
//!   can never hold, so the route stays visible to introspection
//! - Collections keep insertion order; re-adding a name moves it to the end
//! - Collections carry the resources they were loaded from so file watchers
//!   know what to observe

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::Request;
use serde::{Deserialize, Serialize};

use crate::routing::matcher::{HeaderMatcher, HostMatcher, Matcher};

/// Dispatch condition attached to a route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    #[default]
    Always,
    /// Permanently unsatisfiable. Set by route suppression.
    Never,
    /// Host header must equal this value (case-insensitive).
    Host(String),
    /// Header must be present with exactly this value.
    Header { name: String, value: String },
}

impl Condition {
    /// Evaluate the condition against a request.
    pub fn evaluate(&self, req: &Request<Body>) -> bool {
        match self {
            Condition::Always => true,
            Condition::Never => false,
            Condition::Host(host) => HostMatcher::new(host.as_str()).matches(req),
            Condition::Header { name, value } => {
                HeaderMatcher::new(name.as_str(), value.as_str()).matches(req)
            }
        }
    }
}

/// A single route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Path pattern, e.g. `/products/{slug}`.
    pub path: String,

    /// Allowed HTTP methods (uppercase). Empty means any method.
    #[serde(default)]
    pub methods: Vec<String>,

    #[serde(default)]
    pub condition: Condition,

    /// Static attributes handed to the handler (controller name, template...).
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,
}

impl Route {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: normalize_path(path.into()),
            methods: Vec::new(),
            condition: Condition::Always,
            defaults: BTreeMap::new(),
        }
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.methods = methods
            .into_iter()
            .map(|m| m.as_ref().to_ascii_uppercase())
            .collect();
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    /// Make the route permanently unreachable.
    pub fn suppress(&mut self) {
        self.condition = Condition::Never;
    }

    pub fn is_reachable(&self) -> bool {
        self.condition != Condition::Never
    }

    pub fn allows_method(&self, method: &str) -> bool {
        self.methods.is_empty() || self.methods.iter().any(|m| m.eq_ignore_ascii_case(method))
    }
}

/// Route paths always start with `/`.
pub(crate) fn normalize_path(mut path: String) -> String {
    if !path.starts_with('/') {
        path.insert(0, '/');
    }
    path
}

/// Something on disk a route collection was built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum Resource {
    File(PathBuf),
    Directory(PathBuf),
}

impl Resource {
    pub fn path(&self) -> &Path {
        match self {
            Resource::File(path) | Resource::Directory(path) => path,
        }
    }
}

/// Ordered mapping from route name to route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteCollection {
    routes: Vec<(String, Route)>,
    // name -> position in `routes`
    index: HashMap<String, usize>,
    resources: Vec<Resource>,
}

impl RouteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route. An existing route with the same name is replaced and the
    /// new one moves to the end.
    pub fn add(&mut self, name: impl Into<String>, route: Route) {
        let name = name.into();
        if let Some(position) = self.index.remove(&name) {
            self.routes.remove(position);
            for (_, slot) in self.index.iter_mut() {
                if *slot > position {
                    *slot -= 1;
                }
            }
        }
        self.index.insert(name.clone(), self.routes.len());
        self.routes.push((name, route));
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.index.get(name).map(|&position| &self.routes[position].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Route)> {
        self.routes.iter().map(|(name, route)| (name.as_str(), route))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Route)> {
        self.routes
            .iter_mut()
            .map(|(name, route)| (name.as_str(), route))
    }

    pub fn names(&self) -> Vec<&str> {
        self.routes.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Track a resource. Duplicates are ignored.
    pub fn add_resource(&mut self, resource: Resource) {
        if !self.resources.contains(&resource) {
            self.resources.push(resource);
        }
    }

    /// Prefix every route path, e.g. `/shop` turns `/cart` into `/shop/cart`.
    pub fn add_prefix(&mut self, prefix: &str) {
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            return;
        }

        for (_, route) in self.routes.iter_mut() {
            let path = route.path.trim_matches('/');
            route.path = if path.is_empty() {
                format!("/{prefix}")
            } else {
                format!("/{prefix}/{path}")
            };
        }
    }

    /// Merge another collection's routes and resources into this one.
    pub fn add_collection(&mut self, other: RouteCollection) {
        for (name, route) in other.routes {
            self.add(name, route);
        }
        for resource in other.resources {
            self.add_resource(resource);
        }
    }
}

impl IntoIterator for RouteCollection {
    type Item = (String, Route);
    type IntoIter = std::vec::IntoIter<(String, Route)>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.into_iter()
    }
}

//! Request matching primitives.
//!
//! # Responsibilities
//! - Match host header (exact match, case-insensitive)
//! - Match path prefix (case-sensitive), used by firewalls
//! - Match path patterns with `{param}` placeholders, used by routes
//! - Match a header value, used by route conditions
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Host matching is case-insensitive (RFC 9110), port is ignored
//! - Path matching is case-sensitive
//! - Empty condition = always matches (wildcard)
//! - No regex to guarantee O(n) matching

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::Request;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Extract the host of a request without its port, lowercased.
pub fn request_host(req: &Request<Body>) -> Option<String> {
    let raw = req
        .headers()
        .get("host")
        .and_then(|h| h.to_str().ok())
        .or_else(|| req.uri().host())?;

    let host = raw.rsplit_once(':').map_or(raw, |(host, port)| {
        if port.chars().all(|c| c.is_ascii_digit()) {
            host
        } else {
            raw
        }
    });

    Some(host.to_lowercase())
}

/// Matches the Host header.
#[derive(Debug, Clone)]
pub struct HostMatcher {
    expected_host: String,
}

impl HostMatcher {
    /// Create a new host matcher.
    /// The host is normalized to lowercase for case-insensitive matching.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            expected_host: host.into().to_lowercase(),
        }
    }
}

impl Matcher for HostMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        request_host(req)
            .map(|h| h == self.expected_host)
            .unwrap_or(false)
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.uri().path().starts_with(&self.prefix)
    }
}

/// Matches a header against an exact value.
#[derive(Debug, Clone)]
pub struct HeaderMatcher {
    name: String,
    value: String,
}

impl HeaderMatcher {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Matcher for HeaderMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.headers()
            .get(self.name.as_str())
            .and_then(|h| h.to_str().ok())
            .map(|h| h == self.value)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Matches a full path against a pattern such as `/products/{slug}`.
///
/// Each `{name}` placeholder captures exactly one non-empty segment.
#[derive(Debug, Clone)]
pub struct PathPatternMatcher {
    segments: Vec<Segment>,
}

impl PathPatternMatcher {
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .trim_start_matches('/')
            .split('/')
            .map(|segment| {
                match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                    Some(param) if !param.is_empty() => Segment::Param(param.to_string()),
                    _ => Segment::Literal(segment.to_string()),
                }
            })
            .collect();

        Self { segments }
    }

    /// Returns the captured parameters if `path` matches the pattern.
    pub fn captures(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let parts: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Param(name) if !part.is_empty() => {
                    params.insert(name.clone(), part.to_string());
                }
                _ => return None,
            }
        }

        Some(params)
    }
}

impl Matcher for PathPatternMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.captures(req.uri().path()).is_some()
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        // All matchers must pass (AND)
        self.matchers.iter().all(|m| m.matches(req))
    }
}

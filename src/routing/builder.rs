//! Route table construction with feature suppression.
//!
//! # Data Flow
//! ```text
//! import(resource, prefix, type)
//!     → primary loader, or its resolver when it declines
//!     → one or more raw collections
//!     → suppress each collection independently
//!     → merge routes + resources, apply prefix
//!     → mount into this builder
//! build()
//!     → flatten routes and mounts in insertion order
//! ```
//!
//! # Design Decisions
//! - The suppression list is computed on every import from the current policy
//! - Load failures propagate unchanged; nothing is retried

use std::sync::Arc;

use crate::routing::groups::FeaturePolicy;
use crate::routing::loader::{LoadError, RouteLoader};
use crate::routing::route::{Resource, Route, RouteCollection};
use crate::routing::suppression::RouteSuppressionEngine;

#[derive(Debug)]
enum Entry {
    Route(String, Route),
    Mount(RouteCollection),
}

/// Accumulates routes and imported collections into a single table.
pub struct RouteCollectionBuilder {
    policy: Arc<dyn FeaturePolicy>,
    loader: Option<Arc<dyn RouteLoader>>,
    entries: Vec<Entry>,
    resources: Vec<Resource>,
}

impl RouteCollectionBuilder {
    pub fn new(policy: Arc<dyn FeaturePolicy>, loader: Option<Arc<dyn RouteLoader>>) -> Self {
        Self {
            policy,
            loader,
            entries: Vec::new(),
            resources: Vec::new(),
        }
    }

    /// An empty builder sharing this builder's policy and loader.
    pub fn create_builder(&self) -> Self {
        Self::new(self.policy.clone(), self.loader.clone())
    }

    pub fn add_route(&mut self, name: impl Into<String>, route: Route) -> &mut Self {
        self.entries.push(Entry::Route(name.into(), route));
        self
    }

    pub fn add_resource(&mut self, resource: Resource) -> &mut Self {
        if !self.resources.contains(&resource) {
            self.resources.push(resource);
        }
        self
    }

    /// Mount another builder's routes under `prefix`.
    pub fn mount(&mut self, prefix: &str, builder: RouteCollectionBuilder) -> &mut Self {
        let mut collection = builder.build();
        collection.add_prefix(prefix);
        self.entries.push(Entry::Mount(collection));
        self
    }

    /// Load `resource`, suppress disabled routes and mount the result under
    /// `prefix`. Returns the mounted collection.
    pub fn import(
        &mut self,
        resource: &str,
        prefix: &str,
        kind: Option<&str>,
    ) -> Result<RouteCollection, LoadError> {
        let collections = self.load(resource, kind)?;
        let engine = RouteSuppressionEngine::from_policy(self.policy.as_ref());

        let mut merged = RouteCollection::new();
        for collection in collections {
            merged.add_collection(engine.suppress(collection));
        }
        merged.add_prefix(prefix);

        let suppressed = merged.iter().filter(|(_, route)| !route.is_reachable()).count();
        tracing::info!(
            resource = %resource,
            prefix = %prefix,
            routes = merged.len(),
            suppressed,
            "Routing resource imported"
        );

        self.entries.push(Entry::Mount(merged.clone()));
        Ok(merged)
    }

    fn load(&self, resource: &str, kind: Option<&str>) -> Result<Vec<RouteCollection>, LoadError> {
        let loader = self
            .loader
            .as_ref()
            .ok_or_else(|| LoadError::NoLoaderConfigured {
                resource: resource.to_string(),
            })?;

        if loader.supports(resource, kind) {
            return Ok(loader.load(resource, kind)?.into_collections());
        }

        let resolved = loader
            .resolver()
            .and_then(|resolver| resolver.resolve(resource, kind));

        match (resolved, kind) {
            (Some(resolved), _) => Ok(resolved.load(resource, kind)?.into_collections()),
            (None, Some(kind)) => Err(LoadError::UnsupportedType {
                resource: resource.to_string(),
                kind: kind.to_string(),
            }),
            (None, None) => Err(LoadError::NoLoaderFound {
                resource: resource.to_string(),
            }),
        }
    }

    /// Flatten everything added so far into one collection.
    pub fn build(self) -> RouteCollection {
        let mut routes = RouteCollection::new();
        for entry in self.entries {
            match entry {
                Entry::Route(name, route) => routes.add(name, route),
                Entry::Mount(collection) => routes.add_collection(collection),
            }
        }
        for resource in self.resources {
            routes.add_resource(resource);
        }
        routes
    }
}

impl std::fmt::Debug for RouteCollectionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteCollectionBuilder")
            .field("loader", &self.loader)
            .field("entries", &self.entries)
            .field("resources", &self.resources)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::loader::{default_loader, LoadedRoutes};

    struct Policy(bool);

    impl FeaturePolicy for Policy {
        fn are_customers_allowed(&self) -> bool {
            self.0
        }
        fn are_zones_allowed(&self) -> bool {
            false
        }
        fn are_countries_allowed(&self) -> bool {
            false
        }
    }

    /// Hands out two fixed collections for any `memory` resource.
    #[derive(Debug)]
    struct MemoryLoader;

    impl RouteLoader for MemoryLoader {
        fn supports(&self, _resource: &str, kind: Option<&str>) -> bool {
            kind == Some("memory")
        }

        fn load(&self, _resource: &str, _kind: Option<&str>) -> Result<LoadedRoutes, LoadError> {
            let mut shop = RouteCollection::new();
            shop.add("sylius_shop_homepage", Route::new("/"));
            shop.add("sylius_shop_checkout_start", Route::new("/checkout"));
            shop.add_resource(Resource::File("shop.toml".into()));

            let mut admin = RouteCollection::new();
            admin.add("sylius_admin_dashboard", Route::new("/admin"));
            admin.add("sylius_admin_customer_index", Route::new("/admin/customers"));
            admin.add_resource(Resource::File("admin.toml".into()));

            Ok(LoadedRoutes::Many(vec![shop, admin]))
        }
    }

    fn builder(customers_allowed: bool) -> RouteCollectionBuilder {
        RouteCollectionBuilder::new(
            Arc::new(Policy(customers_allowed)),
            Some(Arc::new(MemoryLoader)),
        )
    }

    #[test]
    fn test_import_suppresses_each_collection_and_keeps_resources() {
        let mut builder = builder(false);
        let imported = builder.import("anything", "/", Some("memory")).unwrap();

        assert_eq!(
            imported.names(),
            vec![
                "sylius_shop_homepage",
                "sylius_shop_checkout_start",
                "sylius_admin_dashboard",
                "sylius_admin_customer_index",
            ]
        );
        assert!(imported.get("sylius_shop_homepage").unwrap().is_reachable());
        assert!(!imported.get("sylius_shop_checkout_start").unwrap().is_reachable());
        assert!(imported.get("sylius_admin_dashboard").unwrap().is_reachable());
        assert!(!imported.get("sylius_admin_customer_index").unwrap().is_reachable());
        assert_eq!(
            imported.resources(),
            &[
                Resource::File("shop.toml".into()),
                Resource::File("admin.toml".into())
            ]
        );

        let built = builder.build();
        assert_eq!(built, imported);
    }

    #[test]
    fn test_policy_applied_at_import() {
        let mut builder = builder(true);
        let imported = builder.import("anything", "/", Some("memory")).unwrap();
        assert!(imported.get("sylius_admin_customer_index").unwrap().is_reachable());
    }

    #[test]
    fn test_import_applies_prefix() {
        let mut builder = builder(false);
        let imported = builder.import("anything", "/eu", Some("memory")).unwrap();
        assert_eq!(imported.get("sylius_shop_homepage").unwrap().path, "/eu");
        assert_eq!(imported.get("sylius_admin_dashboard").unwrap().path, "/eu/admin");
    }

    #[test]
    fn test_unsupported_type() {
        let mut builder = builder(false);
        let err = builder.import("routes.xml", "/", Some("xml")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedType { ref kind, .. } if kind == "xml"));
    }

    #[test]
    fn test_no_loader_found() {
        let mut builder = builder(false);
        let err = builder.import("routes.xml", "/", None).unwrap_err();
        assert!(matches!(err, LoadError::NoLoaderFound { .. }));
    }

    #[test]
    fn test_no_loader_configured() {
        let mut builder = RouteCollectionBuilder::new(Arc::new(Policy(false)), None);
        let err = builder.import("routes.toml", "/", None).unwrap_err();
        assert!(matches!(err, LoadError::NoLoaderConfigured { .. }));
    }

    #[test]
    fn test_resolver_fallback_for_directories() {
        let dir = tempfile::tempdir().unwrap();
        let routes_dir = dir.path().join("routes");
        std::fs::create_dir(&routes_dir).unwrap();
        std::fs::write(
            routes_dir.join("shop.toml"),
            "[[routes]]\nname = \"sylius_shop_cart_summary\"\npath = \"/cart\"\n",
        )
        .unwrap();

        let mut builder = RouteCollectionBuilder::new(
            Arc::new(Policy(false)),
            Some(Arc::new(default_loader(dir.path()))),
        );
        let imported = builder.import("routes", "/", Some("directory")).unwrap();

        assert!(!imported.get("sylius_shop_cart_summary").unwrap().is_reachable());
        assert!(imported
            .resources()
            .contains(&Resource::Directory(routes_dir.clone())));
    }

    #[test]
    fn test_manual_routes_and_mounts_keep_order() {
        let mut root = builder(false);
        root.add_route("app_home", Route::new("/"));

        let mut nested = root.create_builder();
        nested.add_route("app_about", Route::new("/about"));
        root.mount("/pages", nested);
        root.add_resource(Resource::File("app.toml".into()));

        let built = root.build();
        assert_eq!(built.names(), vec!["app_home", "app_about"]);
        assert_eq!(built.get("app_about").unwrap().path, "/pages/about");
        assert_eq!(built.resources(), &[Resource::File("app.toml".into())]);
    }
}

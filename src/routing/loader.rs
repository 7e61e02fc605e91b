//! Route loading from disk.
//!
//! # Responsibilities
//! - Decide which loader handles a resource (`supports`)
//! - Parse TOML route files into collections
//! - Expand directories into one collection per file
//! - Fall back to a resolver when the primary loader declines
//!
//! # File format
//! ```toml
//! [[routes]]
//! name = "sylius_shop_checkout_start"
//! path = "/checkout"
//! methods = ["GET"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::routing::route::{normalize_path, Resource, Route, RouteCollection};

/// Errors raised while loading route resources.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The builder was created without a loader.
    #[error("Cannot import routing resource \"{resource}\": no loader configured")]
    NoLoaderConfigured { resource: String },

    #[error("Cannot load resource \"{resource}\": no loader is able to handle it")]
    NoLoaderFound { resource: String },

    #[error("Cannot load resource \"{resource}\": type \"{kind}\" is not supported")]
    UnsupportedType { resource: String, kind: String },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Route \"{name}\" is defined twice in {}", path.display())]
    DuplicateRoute { name: String, path: PathBuf },
}

/// Result of a load: one collection, or one per underlying file.
#[derive(Debug)]
pub enum LoadedRoutes {
    One(RouteCollection),
    Many(Vec<RouteCollection>),
}

impl LoadedRoutes {
    pub fn into_collections(self) -> Vec<RouteCollection> {
        match self {
            LoadedRoutes::One(collection) => vec![collection],
            LoadedRoutes::Many(collections) => collections,
        }
    }
}

/// A source of raw route collections.
pub trait RouteLoader: Send + Sync + std::fmt::Debug {
    fn supports(&self, resource: &str, kind: Option<&str>) -> bool;

    fn load(&self, resource: &str, kind: Option<&str>) -> Result<LoadedRoutes, LoadError>;

    /// Loaders to try when this one declines a resource.
    fn resolver(&self) -> Option<&LoaderResolver> {
        None
    }
}

/// Ordered set of loaders; the first one that supports a resource wins.
#[derive(Debug, Default, Clone)]
pub struct LoaderResolver {
    loaders: Vec<Arc<dyn RouteLoader>>,
}

impl LoaderResolver {
    pub fn new(loaders: Vec<Arc<dyn RouteLoader>>) -> Self {
        Self { loaders }
    }

    pub fn add_loader(&mut self, loader: Arc<dyn RouteLoader>) {
        self.loaders.push(loader);
    }

    pub fn resolve(&self, resource: &str, kind: Option<&str>) -> Option<Arc<dyn RouteLoader>> {
        self.loaders
            .iter()
            .find(|loader| loader.supports(resource, kind))
            .cloned()
    }
}

#[derive(Debug, Deserialize)]
struct RouteFile {
    #[serde(default)]
    routes: Vec<RouteDefinition>,
}

#[derive(Debug, Deserialize)]
struct RouteDefinition {
    name: String,
    #[serde(flatten)]
    route: Route,
}

fn resolve_path(base_dir: &Path, resource: &str) -> PathBuf {
    let path = Path::new(resource);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Parse a single route file.
pub fn read_route_file(path: &Path) -> Result<RouteCollection, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: RouteFile = toml::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut collection = RouteCollection::new();
    for RouteDefinition { name, mut route } in file.routes {
        if collection.contains(&name) {
            return Err(LoadError::DuplicateRoute {
                name,
                path: path.to_path_buf(),
            });
        }
        route.path = normalize_path(route.path);
        let methods = route.methods.clone();
        collection.add(name, route.with_methods(methods));
    }
    collection.add_resource(Resource::File(path.to_path_buf()));

    tracing::debug!(path = %path.display(), routes = collection.len(), "Route file loaded");
    Ok(collection)
}

/// Loads a single `.toml` route file.
#[derive(Debug, Clone)]
pub struct TomlFileLoader {
    base_dir: PathBuf,
    resolver: Option<LoaderResolver>,
}

impl TomlFileLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            resolver: None,
        }
    }

    pub fn with_resolver(mut self, resolver: LoaderResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }
}

impl RouteLoader for TomlFileLoader {
    fn supports(&self, resource: &str, kind: Option<&str>) -> bool {
        match kind {
            Some(kind) => kind == "toml",
            None => resource.ends_with(".toml"),
        }
    }

    fn load(&self, resource: &str, _kind: Option<&str>) -> Result<LoadedRoutes, LoadError> {
        let path = resolve_path(&self.base_dir, resource);
        read_route_file(&path).map(LoadedRoutes::One)
    }

    fn resolver(&self) -> Option<&LoaderResolver> {
        self.resolver.as_ref()
    }
}

/// Loads every `.toml` file of a directory, one collection per file.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    base_dir: PathBuf,
}

impl DirectoryLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl RouteLoader for DirectoryLoader {
    fn supports(&self, _resource: &str, kind: Option<&str>) -> bool {
        kind == Some("directory")
    }

    fn load(&self, resource: &str, _kind: Option<&str>) -> Result<LoadedRoutes, LoadError> {
        let dir = resolve_path(&self.base_dir, resource);
        let io_error = |source: std::io::Error| LoadError::Io {
            path: dir.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(&dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
                files.push(path);
            }
        }
        files.sort();

        let mut collections = Vec::with_capacity(files.len());
        for file in &files {
            let mut collection = read_route_file(file)?;
            collection.add_resource(Resource::Directory(dir.clone()));
            collections.push(collection);
        }

        Ok(LoadedRoutes::Many(collections))
    }
}

/// Loader used by the server: files directly, directories via the resolver.
pub fn default_loader(base_dir: impl Into<PathBuf>) -> TomlFileLoader {
    let base_dir = base_dir.into();
    let resolver = LoaderResolver::new(vec![Arc::new(DirectoryLoader::new(base_dir.clone()))]);
    TomlFileLoader::new(base_dir).with_resolver(resolver)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_toml_file_loader() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "shop.toml",
            r#"
            [[routes]]
            name = "sylius_shop_homepage"
            path = "/"

            [[routes]]
            name = "sylius_shop_cart_summary"
            path = "/cart"
            methods = ["get"]
            "#,
        );

        let loader = TomlFileLoader::new(dir.path());
        assert!(loader.supports("shop.toml", None));
        assert!(!loader.supports("shop", None));
        assert!(!loader.supports("shop.toml", Some("directory")));

        let collections = loader.load("shop.toml", None).unwrap().into_collections();
        assert_eq!(collections.len(), 1);

        let routes = &collections[0];
        assert_eq!(routes.names(), vec!["sylius_shop_homepage", "sylius_shop_cart_summary"]);
        assert_eq!(routes.get("sylius_shop_cart_summary").unwrap().methods, vec!["GET"]);
        assert_eq!(
            routes.resources(),
            &[Resource::File(dir.path().join("shop.toml"))]
        );
    }

    #[test]
    fn test_paths_get_leading_slash() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "shop.toml",
            "[[routes]]\nname = \"app_products\"\npath = \"products\"\n",
        );

        let mut routes = TomlFileLoader::new(dir.path())
            .load("shop.toml", None)
            .unwrap()
            .into_collections()
            .remove(0);
        assert_eq!(routes.get("app_products").unwrap().path, "/products");

        routes.add_prefix("/shop");
        assert_eq!(routes.get("app_products").unwrap().path, "/shop/products");
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "dup.toml",
            r#"
            [[routes]]
            name = "a"
            path = "/a"

            [[routes]]
            name = "a"
            path = "/b"
            "#,
        );

        let err = TomlFileLoader::new(dir.path()).load("dup.toml", None).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateRoute { ref name, .. } if name == "a"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TomlFileLoader::new(dir.path()).load("nope.toml", None).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_directory_loader_one_collection_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let routes_dir = dir.path().join("routes");
        fs::create_dir(&routes_dir).unwrap();
        write(&routes_dir, "b.toml", "[[routes]]\nname = \"b\"\npath = \"/b\"\n");
        write(&routes_dir, "a.toml", "[[routes]]\nname = \"a\"\npath = \"/a\"\n");
        write(&routes_dir, "notes.txt", "ignored");

        let loader = DirectoryLoader::new(dir.path());
        assert!(loader.supports("routes", Some("directory")));
        assert!(!loader.supports("routes", None));

        let collections = loader.load("routes", Some("directory")).unwrap().into_collections();
        assert_eq!(collections.len(), 2);
        assert_eq!(collections[0].names(), vec!["a"]);
        assert_eq!(collections[1].names(), vec!["b"]);
        assert!(collections[0]
            .resources()
            .contains(&Resource::Directory(routes_dir.clone())));
    }

    #[test]
    fn test_resolver_picks_first_supporting_loader() {
        let loader = default_loader("/srv");
        let resolver = loader.resolver().unwrap();

        assert!(resolver.resolve("routes", Some("directory")).is_some());
        assert!(resolver.resolve("routes.xml", Some("xml")).is_none());
    }
}

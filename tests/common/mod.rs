//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use storefront_gate::config::{
    ChannelConfig, FirewallConfig, GateConfig, RouteImportConfig,
};
use storefront_gate::{HttpServer, Shutdown};

pub const SHOP_ROUTES: &str = r#"
[[routes]]
name = "sylius_shop_homepage"
path = "/"

[[routes]]
name = "sylius_shop_product_show"
path = "/products/{slug}"
methods = ["GET"]

[[routes]]
name = "sylius_shop_checkout_start"
path = "/checkout"

[[routes]]
name = "sylius_shop_login"
path = "/login"

[[routes]]
name = "_wdt"
path = "/_wdt/{token}"
"#;

pub const ADMIN_ROUTES: &str = r#"
[[routes]]
name = "sylius_admin_dashboard"
path = "/"

[[routes]]
name = "sylius_admin_zone_index"
path = "/zones"

[[routes]]
name = "sylius_admin_country_index"
path = "/countries"
"#;

/// Write a route file below `dir`, creating parent directories.
pub fn write_routes(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Config with a shop file import, an admin directory import, one channel
/// and shop/admin firewalls.
pub fn storefront_config(dir: &Path) -> GateConfig {
    write_routes(dir, "shop.toml", SHOP_ROUTES);
    write_routes(dir, "admin/routes.toml", ADMIN_ROUTES);

    let mut config = GateConfig::default();
    config.routing.resource_dir = dir.to_string_lossy().into_owned();
    config.routing.imports = vec![
        RouteImportConfig {
            resource: "shop.toml".into(),
            prefix: "/".into(),
            kind: None,
        },
        RouteImportConfig {
            resource: "admin".into(),
            prefix: "/admin".into(),
            kind: Some("directory".into()),
        },
    ];
    config.channels = vec![ChannelConfig {
        code: "WEB".into(),
        hostnames: vec!["shop.example.com".into()],
        disabled_firewall_contexts: None,
    }];
    config.firewalls = vec![
        FirewallConfig {
            name: "admin".into(),
            path_prefix: Some("/admin".into()),
            host: None,
            context: None,
        },
        FirewallConfig {
            name: "shop".into(),
            path_prefix: Some("/".into()),
            host: None,
            context: None,
        },
    ];
    config
}

pub struct RunningServer {
    pub addr: SocketAddr,
    pub updates: mpsc::UnboundedSender<GateConfig>,
    pub shutdown: Shutdown,
}

/// Start a server on an ephemeral port.
pub async fn start_server(config: GateConfig) -> RunningServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (updates, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    RunningServer {
        addr,
        updates,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

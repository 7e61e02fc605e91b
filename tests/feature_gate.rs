//! End-to-end tests against a running server.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use storefront_gate::config::ChannelConfig;

mod common;

const SHOP_HOST: &str = "shop.example.com";

async fn get(addr: std::net::SocketAddr, path: &str, host: &str) -> reqwest::Response {
    common::client()
        .get(format!("http://{addr}{path}"))
        .header("Host", host)
        .send()
        .await
        .expect("server unreachable")
}

#[tokio::test]
async fn test_matched_route_is_served() {
    let dir = tempfile::tempdir().unwrap();
    let server = common::start_server(common::storefront_config(dir.path())).await;

    let res = get(server.addr, "/", SHOP_HOST).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["route"], "sylius_shop_homepage");

    let res = get(server.addr, "/_wdt/abc", SHOP_HOST).await;
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["params"]["token"], "abc");

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_suppressed_routes_look_like_missing_routes() {
    let dir = tempfile::tempdir().unwrap();
    let server = common::start_server(common::storefront_config(dir.path())).await;

    let suppressed = get(server.addr, "/checkout", SHOP_HOST).await;
    assert_eq!(suppressed.status(), StatusCode::NOT_FOUND);
    let suppressed_body = suppressed.text().await.unwrap();

    let missing = get(server.addr, "/does-not-exist", SHOP_HOST).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(missing.text().await.unwrap(), suppressed_body);

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_disabled_context_rejected_as_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::storefront_config(dir.path());
    config.channels[0].disabled_firewall_contexts = Some(vec!["shop".into()]);
    let server = common::start_server(config).await;

    // shop firewall disabled
    let res = get(server.addr, "/", SHOP_HOST).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await.unwrap(), "Route not found");

    // admin firewall untouched
    assert_eq!(get(server.addr, "/admin", SHOP_HOST).await.status(), StatusCode::OK);

    // profiler toolbar always reachable
    assert_eq!(get(server.addr, "/_wdt/abc", SHOP_HOST).await.status(), StatusCode::OK);

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_no_channel_fails_open() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::storefront_config(dir.path());
    config.channels = vec![
        ChannelConfig {
            code: "FR".into(),
            hostnames: vec!["shop.fr".into()],
            disabled_firewall_contexts: Some(vec!["shop".into()]),
        },
        ChannelConfig {
            code: "US".into(),
            hostnames: vec!["shop.com".into()],
            disabled_firewall_contexts: Some(vec!["shop".into()]),
        },
    ];
    let server = common::start_server(config).await;

    assert_eq!(get(server.addr, "/", "shop.fr").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(get(server.addr, "/", "localhost").await.status(), StatusCode::OK);

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_config_update_swaps_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::storefront_config(dir.path());
    let server = common::start_server(config.clone()).await;

    assert_eq!(get(server.addr, "/login", SHOP_HOST).await.status(), StatusCode::NOT_FOUND);

    let mut updated = config.clone();
    updated.features.customers_allowed = true;
    server.updates.send(updated).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(get(server.addr, "/login", SHOP_HOST).await.status(), StatusCode::OK);

    // A broken update keeps the current runtime.
    let mut broken = config;
    broken.routing.imports[0].resource = "missing.toml".into();
    server.updates.send(broken).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(get(server.addr, "/login", SHOP_HOST).await.status(), StatusCode::OK);

    server.shutdown.trigger();
}

use std::path::PathBuf;

use axum::body::Body;
use axum::http::Request;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use storefront_gate::config::{load_config, GateConfig};
use storefront_gate::observability::logging;
use storefront_gate::routing::groups::{compute_active_suppression_list, suppressed_groups};
use storefront_gate::security::{Decision, RequestType};
use storefront_gate::Runtime;

#[derive(Parser)]
#[command(name = "gatectl")]
#[command(about = "Inspect the storefront gate offline", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show suppressed feature groups and route-name fragments
    Suppression,
    /// List the route table with reachability
    Routes,
    /// Evaluate routing and the feature gate for a request
    Check {
        #[arg(long)]
        path: String,

        #[arg(long)]
        host: Option<String>,

        #[arg(long, default_value = "GET")]
        method: String,

        /// Treat the request as an internal sub-request
        #[arg(long)]
        sub_request: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GateConfig::default(),
    };
    logging::init_logging(&config.observability);

    let output = match cli.command {
        Commands::Suppression => {
            let groups: Vec<&str> = suppressed_groups(&config.features)
                .iter()
                .map(|group| group.as_str())
                .collect();
            json!({
                "groups": groups,
                "fragments": compute_active_suppression_list(&config.features),
            })
        }
        Commands::Routes => {
            let runtime = Runtime::build(&config)?;
            let routes: Vec<Value> = runtime
                .router
                .routes()
                .map(|(name, route)| {
                    json!({
                        "name": name,
                        "path": route.path,
                        "methods": route.methods,
                        "reachable": route.is_reachable(),
                    })
                })
                .collect();
            json!({ "routes": routes, "resources": runtime.resources })
        }
        Commands::Check {
            path,
            host,
            method,
            sub_request,
        } => {
            let runtime = Runtime::build(&config)?;

            let mut builder = Request::builder().method(method.as_str()).uri(path.as_str());
            if let Some(host) = &host {
                builder = builder.header("Host", host.as_str());
            }
            let mut req = builder.body(Body::empty())?;
            if sub_request {
                req.extensions_mut().insert(RequestType::Sub);
            }

            let matched = runtime.router.match_request(&req);
            if let Some(matched) = &matched {
                req.extensions_mut().insert(matched.clone());
            }

            let decision = match runtime.gate.evaluate(&req) {
                Decision::Allow if matched.is_some() => "allow",
                Decision::Allow => "not_found",
                Decision::Reject(_) => "rejected",
            };
            json!({ "route": matched, "decision": decision })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

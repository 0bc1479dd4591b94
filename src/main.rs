use request_mesh::config::MeshConfig;
use request_mesh::executor::registry::FunctionRegistry;
use request_mesh::node::MeshNode;

use serde_json::json;
use std::net::SocketAddr;
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!(
            "Usage: {} --bind <addr:port> [--referral <addr:port>] [--config <path.json>]",
            args[0]
        );
        eprintln!("Example: {} --bind 127.0.0.1:7000", args[0]);
        eprintln!(
            "Example: {} --bind 127.0.0.1:7001 --referral 127.0.0.1:7000",
            args[0]
        );

        std::process::exit(1);
    }

    let mut bind_addr: Option<SocketAddr> = None;
    let mut referrals: Vec<String> = vec![];
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" => {
                bind_addr = Some(args[i + 1].parse()?);
                i += 2;
            }
            "--referral" => {
                referrals.push(args[i + 1].clone());
                i += 2;
            }
            "--config" => {
                config_path = Some(args[i + 1].clone());
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let bind_addr = bind_addr.expect("--bind is required");

    let mut config = match config_path {
        Some(path) => MeshConfig::from_file(Path::new(&path))?,
        None => MeshConfig::default(),
    };
    config.bind_addr = bind_addr;

    config
        .referrals
        .extend(MeshConfig::parse_referrals(&referrals.join(",")));
    if let Ok(env_referrals) = std::env::var("MESH_REFERRALS") {
        config
            .referrals
            .extend(MeshConfig::parse_referrals(&env_referrals));
    }

    if config.referrals.is_empty() {
        tracing::info!("No referrals; starting as a founding node");
    }

    // A few built-in callables so a fresh cluster is drivable via /call.
    let functions = FunctionRegistry::new();

    functions.register("strings", "upcase", 1, |args| async move {
        let text = args[0]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("expected a string"))?;
        Ok(json!(text.to_uppercase()))
    });

    functions.register("math", "square", 1, |args| async move {
        let n = args[0]
            .as_i64()
            .ok_or_else(|| anyhow::anyhow!("expected an integer"))?;
        Ok(json!(n * n))
    });

    functions.register("util", "echo", 1, |mut args| async move {
        Ok(args.pop().unwrap_or(serde_json::Value::Null))
    });

    let node = MeshNode::start(config, functions).await?;
    tracing::info!("Node {} ready", node.name);
    tracing::info!("Press Ctrl+C to shutdown");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    Ok(())
}

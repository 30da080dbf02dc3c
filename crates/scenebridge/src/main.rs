use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use scenebridge::bus::Bus;
use scenebridge::catalog;
use scenebridge::config;
use scenebridge::engine::{RpcEngine, SharedEngine, StubEngine};
use scenebridge::error::{CoreError, CoreResult};
use scenebridge::server::Server;
use scenebridge::tools::ToolRegistry;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the server config file (created with defaults if absent)
    #[arg(short, long, default_value = config::CONFIG_FILENAME)]
    config: String,

    /// Override the listen address
    #[arg(long)]
    listen: Option<String>,

    /// Override the engine bridge address
    #[arg(long)]
    engine: Option<String>,

    /// Run against the in-memory stub engine instead of a Blender bridge
    #[arg(long)]
    stub: bool,
}

#[tokio::main]
async fn main() -> CoreResult<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut config = config::load_or_create(Path::new(&args.config))?;
    if let Some(listen) = args.listen {
        config.listen = listen;
    }
    if let Some(engine) = args.engine {
        config.engine.address = engine;
    }
    if args.stub {
        config.engine.stub = true;
    }

    let engine: SharedEngine = if config.engine.stub {
        info!("using in-memory stub engine");
        Arc::new(StubEngine::new())
    } else {
        info!("using engine bridge at {}", config.engine.address);
        Arc::new(RpcEngine::with_timeout(
            config.engine.address.clone(),
            Duration::from_millis(config.engine.timeout_ms),
        ))
    };

    let mut registry = ToolRegistry::new();
    catalog::register_all(&mut registry)?;
    info!("registered {} tools", registry.len());

    let bus = Bus::new(64);
    let mut server = Server::start(&config.listen, Arc::new(registry), engine, bus).await?;
    info!("listening on http://{}", server.addr());

    tokio::signal::ctrl_c()
        .await
        .map_err(|err| CoreError::Internal(format!("failed to wait for ctrl-c: {err}")))?;
    info!("shutting down");
    server.shutdown()
}

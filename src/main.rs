//! Rajmarg - highway motion planner daemon

use clap::Parser;
use rajmarg::config::RajmargConfig;
use rajmarg::engine::Planner;
use rajmarg::error::Result;
use rajmarg::io::TelemetryServer;
use rajmarg::map::HighwayMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "rajmarg", version, about = "Highway motion planner")]
struct Args {
    /// Path to the TOML configuration file
    config: Option<PathBuf>,

    /// Override the simulator listen port
    #[arg(long)]
    port: Option<u16>,

    /// Override the waypoint map file
    #[arg(long)]
    map: Option<PathBuf>,

    /// Seed the candidate-sampling RNG for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            log::info!("loading configuration from {:?}", path);
            RajmargConfig::load(path)?
        }
        None if Path::new("rajmarg.toml").exists() => {
            log::info!("loading configuration from rajmarg.toml");
            RajmargConfig::load(Path::new("rajmarg.toml"))?
        }
        None => {
            log::info!("using default configuration");
            RajmargConfig::default()
        }
    };
    if let Some(port) = args.port {
        config.network.port = port;
    }
    if let Some(map) = args.map {
        config.map.path = map.to_string_lossy().into_owned();
    }
    if let Some(seed) = args.seed {
        config.trajectory.seed = Some(seed);
    }

    log::info!("Rajmarg v{} starting...", env!("CARGO_PKG_VERSION"));

    // A map failure is fatal: without the dense tables nothing can plan
    let map = HighwayMap::load(Path::new(&config.map.path))?;
    log::info!(
        "map loaded: {} dense waypoints, loop length {:.1} m",
        map.len(),
        map.s_max()
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| {
        rajmarg::error::RajmargError::Config(format!("failed to set Ctrl-C handler: {}", e))
    })?;

    let server = TelemetryServer::bind(config.network.port, Arc::clone(&running))?;
    let mut planner = Planner::new(config, map);

    log::info!("Rajmarg running. Press Ctrl-C to stop.");
    server.run(&mut planner)?;

    log::info!("Rajmarg stopped");
    Ok(())
}

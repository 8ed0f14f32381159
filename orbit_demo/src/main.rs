//! Solar system run
//!
//! Usage: `orbit_demo [scene.toml|scene.ron] [report_every]`
//!
//! Without a scene file the built-in Sun, Earth and Moon system is used.

use orbit_demo::{DemoError, ReportingObserver};
use origin_engine::foundation::logging;
use origin_engine::prelude::*;

const DEFAULT_TICKS: u64 = 10_000;
const DEFAULT_REPORT_EVERY: u64 = 1_000;

fn load_config(path: Option<&str>) -> Result<SimulationConfig, DemoError> {
    let mut config = match path {
        Some(path) => SimulationConfig::load_from_file(path)?,
        None => SimulationConfig::solar_system(),
    };

    // Headless runs need a bound and a fixed step
    if config.engine.max_ticks.is_none() {
        config.engine.max_ticks = Some(DEFAULT_TICKS);
    }
    if config.engine.fixed_timestep.is_none() {
        config.engine.fixed_timestep = Some(1.0 / 60.0);
    }
    Ok(config)
}

fn run() -> Result<(), DemoError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(args.first().map(String::as_str))?;
    logging::init_with_level(&config.engine.log_level);

    let report_every = match args.get(1) {
        Some(value) => value
            .parse()
            .map_err(|_| DemoError::Usage(format!("orbit_demo [scene] [report_every], got '{value}'")))?,
        None => DEFAULT_REPORT_EVERY,
    };

    // Reports need a physics body on both ends
    let bodies: Vec<&str> = config
        .scene
        .bodies
        .iter()
        .filter(|body| body.physics.is_some())
        .map(|body| body.name.as_str())
        .collect();
    let subject = config
        .origin
        .track
        .as_deref()
        .filter(|name| bodies.contains(name))
        .or_else(|| bodies.first().copied())
        .ok_or_else(|| DemoError::Usage("scene has no physics bodies".to_string()))?;
    let mut observer = ReportingObserver::new(subject, report_every);
    if let Some(reference) = bodies.first().filter(|name| **name != subject) {
        observer = observer.with_reference(*reference);
    }

    log::info!("Starting orbit demo with {} bodies", config.scene.bodies.len());
    Engine::run(&config, ProxyRegistry::new(), &mut observer)?;
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        log::error!("Orbit demo failed: {e}");
        eprintln!("{e}");
        std::process::exit(1);
    }
}

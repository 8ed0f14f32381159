//! Asteroid belt run showing proxies moving between levels
//!
//! Usage: `belt_demo [seed] [asteroids]`

use orbit_demo::belt::{belt_scene, BeltParams};
use orbit_demo::{DemoError, ReportingObserver};
use origin_engine::foundation::logging;
use origin_engine::prelude::*;

fn parse_arg<T: std::str::FromStr>(args: &[String], index: usize, default: T) -> Result<T, DemoError> {
    match args.get(index) {
        Some(value) => value
            .parse()
            .map_err(|_| DemoError::Usage(format!("belt_demo [seed] [asteroids], got '{value}'"))),
        None => Ok(default),
    }
}

fn run() -> Result<(), DemoError> {
    logging::init_with_level("info");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let defaults = BeltParams::default();
    let params = BeltParams {
        seed: parse_arg(&args, 0, defaults.seed)?,
        asteroids: parse_arg(&args, 1, defaults.asteroids)?,
        ..defaults
    };

    let mut config = belt_scene(&params);
    config.engine = EngineConfig::new().with_fixed_timestep(1.0).with_max_ticks(500);

    log::info!("Belt of {} asteroids, seed {}", params.asteroids, params.seed);
    let mut observer = ReportingObserver::new("asteroid-0000", 100).with_reference("star");
    let stopwatch = Stopwatch::start_new();
    Engine::run(&config, ProxyRegistry::new(), &mut observer)?;

    let totals = observer.proxy_totals();
    log::info!(
        "Proxy churn: {} created, {} destroyed in {:.1} ms",
        totals.created,
        totals.destroyed,
        stopwatch.elapsed_millis()
    );
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        log::error!("Belt demo failed: {e}");
        eprintln!("{e}");
        std::process::exit(1);
    }
}

//! Seeded asteroid belt around a single star

use origin_engine::physics::GRAVITATIONAL_CONSTANT;
use origin_engine::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Belt generation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct BeltParams {
    /// RNG seed
    pub seed: u64,
    /// Number of asteroids
    pub asteroids: usize,
    /// Star mass in kilograms
    pub star_mass: f64,
    /// Inner belt radius in meters
    pub inner_radius: f64,
    /// Outer belt radius in meters
    pub outer_radius: f64,
    /// Vertical spread of the belt in meters
    pub thickness: f64,
    /// Asteroid radius range in meters
    pub asteroid_radius: (f64, f64),
}

impl Default for BeltParams {
    fn default() -> Self {
        Self {
            seed: 7,
            asteroids: 200,
            star_mass: 6.0e24,
            inner_radius: 1.8e7,
            outer_radius: 2.2e7,
            thickness: 2.0e5,
            asteroid_radius: (500.0, 5.0e4),
        }
    }
}

impl BeltParams {
    /// Circular orbit speed at `radius` around the star
    pub fn orbital_speed(&self, radius: f64) -> f64 {
        (GRAVITATIONAL_CONSTANT * self.star_mass / radius).sqrt()
    }
}

/// Build a belt scene.
///
/// The origin is fixed on an outpost sitting in the belt, and the ladder
/// steps by 1000 so the mid band is about as wide as the belt. Asteroids
/// sweeping past the outpost hop between levels.
///
/// Asteroids receive gravity from the star but do not pull on each other.
pub fn belt_scene(params: &BeltParams) -> SimulationConfig {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let outpost_radius = 0.5 * (params.inner_radius + params.outer_radius);

    let mut scene = SceneDescription::default()
        .with_body(
            BodyDescription::new("star", DVec3::ZERO)
                .with_physics(params.star_mass, DVec3::ZERO, true)
                .with_render(2.0e6, "star", 1.0),
        )
        .with_body(BodyDescription::new("outpost", DVec3::new(outpost_radius, 0.0, 0.0)).with_render(
            200.0,
            "station",
            1.0,
        ));

    for index in 0..params.asteroids {
        let radius = rng.gen_range(params.inner_radius..params.outer_radius);
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        let height = rng.gen_range(-0.5_f64..0.5) * params.thickness;
        let (sin, cos) = angle.sin_cos();

        let position = DVec3::new(radius * cos, height, radius * sin);
        let speed = params.orbital_speed(radius);
        let velocity = DVec3::new(-sin * speed, 0.0, cos * speed);
        let size = rng.gen_range(params.asteroid_radius.0..params.asteroid_radius.1);

        scene = scene.with_body(
            BodyDescription::new(format!("asteroid-{index:04}"), position)
                .with_rotation(DQuat::from_axis_angle(DVec3::UP, angle.to_degrees()))
                .with_physics(rng.gen_range(1.0e12..1.0e16), velocity, false)
                .with_render(size, "rock", 1.0),
        );
    }

    SimulationConfig {
        engine: EngineConfig::default(),
        origin: OriginConfig::default()
            .with_origin(DVec3::new(outpost_radius, 0.0, 0.0))
            .with_scale_factor(1000.0)
            .with_levels(["near", "mid", "far", "distant"])
            .with_time_scale(100.0),
        physics: PhysicsConfig::default(),
        scene,
    }
}

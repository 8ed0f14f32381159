//! # Simulation Configuration
//!
//! Serializable settings for every subsystem plus the scene description the
//! scene is built from. All structures load from TOML or RON through the
//! [`Config`] trait and carry builder-style `with_*` setters and a
//! `validate()` check.
//!
//! ## Configuration Categories
//!
//! - **Engine Config**: logging and the driver loop
//! - **Origin Config**: origin, scale ladder and time scale
//! - **Physics Config**: gravitational constant
//! - **Scene Description**: bodies, their hierarchy and capabilities

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};
use crate::foundation::math::{DQuat, DVec3};
use crate::foundation::time::TimeScale;
use crate::physics::GRAVITATIONAL_CONSTANT;

/// # Engine Configuration
///
/// Logging and driver-loop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Stop after this many ticks; run until quit when `None`
    pub max_ticks: Option<u64>,
    /// Real seconds per tick; measured wall time when `None`
    pub fixed_timestep: Option<f64>,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            max_ticks: None,
            fixed_timestep: None,
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set tick limit
    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    /// Set fixed real timestep
    pub fn with_fixed_timestep(mut self, seconds: f64) -> Self {
        self.fixed_timestep = Some(seconds);
        self
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(dt) = self.fixed_timestep {
            if !dt.is_finite() || dt <= 0.0 {
                return Err(ConfigError::Validation(format!("fixed_timestep must be positive, got {dt}")));
            }
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Origin Configuration
///
/// Floating origin, scale ladder and initial time scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Fixed origin
    pub origin: DVec3,
    /// Name of the body the origin follows
    pub track: Option<String>,
    /// Factor between consecutive levels
    pub scale_factor: f64,
    /// One name per level, nearest first
    pub level_names: Vec<String>,
    /// Initial simulation time multiplier
    pub time_scale: f64,
}

impl OriginConfig {
    /// Create the default three-level ladder
    pub fn new() -> Self {
        Self {
            origin: DVec3::ZERO,
            track: None,
            scale_factor: 8000.0,
            level_names: vec!["near".to_string(), "mid".to_string(), "far".to_string()],
            time_scale: TimeScale::DEFAULT,
        }
    }

    /// Set fixed origin
    pub fn with_origin(mut self, origin: DVec3) -> Self {
        self.origin = origin;
        self
    }

    /// Follow a body by name
    pub fn with_track(mut self, body: impl Into<String>) -> Self {
        self.track = Some(body.into());
        self
    }

    /// Set the per-level factor
    pub fn with_scale_factor(mut self, factor: f64) -> Self {
        self.scale_factor = factor;
        self
    }

    /// Set level names
    pub fn with_levels<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.level_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set time scale
    pub fn with_time_scale(mut self, time_scale: f64) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.scale_factor.is_finite() || self.scale_factor <= 1.0 {
            return Err(ConfigError::Validation(format!(
                "scale_factor must be finite and > 1, got {}",
                self.scale_factor
            )));
        }
        if self.level_names.is_empty() {
            return Err(ConfigError::Validation("at least one level is required".to_string()));
        }
        if !self.origin.is_finite() {
            return Err(ConfigError::Validation(format!("origin is not finite: {}", self.origin)));
        }
        if self.time_scale.is_nan() {
            return Err(ConfigError::Validation("time_scale is NaN".to_string()));
        }
        Ok(())
    }
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Physics Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravitational constant in m^3 kg^-1 s^-2
    pub gravitational_constant: f64,
}

impl PhysicsConfig {
    /// Newtonian gravity
    pub fn new() -> Self {
        Self {
            gravitational_constant: GRAVITATIONAL_CONSTANT,
        }
    }

    /// Set gravitational constant
    pub fn with_gravitational_constant(mut self, g: f64) -> Self {
        self.gravitational_constant = g;
        self
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gravitational_constant.is_finite() || self.gravitational_constant < 0.0 {
            return Err(ConfigError::Validation(format!(
                "gravitational_constant must be finite and non-negative, got {}",
                self.gravitational_constant
            )));
        }
        Ok(())
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Physics capability of a body description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsDescription {
    /// Mass in kilograms
    pub mass: f64,
    /// Initial velocity
    #[serde(default)]
    pub velocity: DVec3,
    /// Pulls on other bodies
    #[serde(default)]
    pub generates_gravity: bool,
    /// Is pulled by generating bodies
    #[serde(default = "default_true")]
    pub receives_gravity: bool,
}

/// Render capability of a body description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderDescription {
    /// True radius
    pub radius: f64,
    /// Radius of the prefab at unit scale
    #[serde(default = "default_one")]
    pub prefab_radius: f64,
    /// Prefab name; no proxies without one
    #[serde(default)]
    pub prefab: Option<String>,
    /// Start hidden
    #[serde(default)]
    pub hidden: bool,
}

/// One entity in a scene description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDescription {
    /// Unique name
    pub name: String,
    /// Name of an earlier body to attach under
    #[serde(default)]
    pub parent: Option<String>,
    /// Position relative to the parent
    #[serde(default)]
    pub position: DVec3,
    /// Rotation relative to the parent
    #[serde(default)]
    pub rotation: DQuat,
    /// Physics capability
    #[serde(default)]
    pub physics: Option<PhysicsDescription>,
    /// Render capability
    #[serde(default)]
    pub render: Option<RenderDescription>,
    /// Active flag
    #[serde(default = "default_true")]
    pub active: bool,
}

impl BodyDescription {
    /// A bare active root body at `position`
    pub fn new(name: impl Into<String>, position: DVec3) -> Self {
        Self {
            name: name.into(),
            parent: None,
            position,
            rotation: DQuat::IDENTITY,
            physics: None,
            render: None,
            active: true,
        }
    }

    /// Attach under a named parent
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set local rotation
    pub fn with_rotation(mut self, rotation: DQuat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Add a physics body
    pub fn with_physics(mut self, mass: f64, velocity: DVec3, generates_gravity: bool) -> Self {
        self.physics = Some(PhysicsDescription {
            mass,
            velocity,
            generates_gravity,
            receives_gravity: true,
        });
        self
    }

    /// Add a spatial object drawn with `prefab`
    pub fn with_render(mut self, radius: f64, prefab: impl Into<String>, prefab_radius: f64) -> Self {
        self.render = Some(RenderDescription {
            radius,
            prefab_radius,
            prefab: Some(prefab.into()),
            hidden: false,
        });
        self
    }

    /// Set active flag
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// # Scene Description
///
/// Bodies in creation order; a parent must be listed before its children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    /// Bodies to spawn
    pub bodies: Vec<BodyDescription>,
}

impl SceneDescription {
    /// Append a body
    pub fn with_body(mut self, body: BodyDescription) -> Self {
        self.bodies.push(body);
        self
    }

    /// Validate names, parent order and capability values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for body in &self.bodies {
            if let Some(parent) = &body.parent {
                if !seen.contains(parent.as_str()) {
                    return Err(ConfigError::Validation(format!(
                        "body '{}' names parent '{}' which is not defined before it",
                        body.name, parent
                    )));
                }
            }
            if !seen.insert(body.name.as_str()) {
                return Err(ConfigError::Validation(format!("duplicate body name '{}'", body.name)));
            }
            if let Some(physics) = &body.physics {
                if !physics.mass.is_finite() || physics.mass <= 0.0 {
                    return Err(ConfigError::Validation(format!(
                        "body '{}' has invalid mass {}",
                        body.name, physics.mass
                    )));
                }
            }
            if let Some(render) = &body.render {
                let radius_ok = render.radius.is_finite() && render.radius >= 0.0;
                let prefab_ok = render.prefab_radius.is_finite() && render.prefab_radius > 0.0;
                if !radius_ok || !prefab_ok {
                    return Err(ConfigError::Validation(format!(
                        "body '{}' has invalid radius {} / prefab radius {}",
                        body.name, render.radius, render.prefab_radius
                    )));
                }
            }
        }
        Ok(())
    }
}

/// # Complete Simulation Configuration
///
/// Top-level configuration applications load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Engine settings
    pub engine: EngineConfig,
    /// Origin and scale ladder
    pub origin: OriginConfig,
    /// Physics settings
    pub physics: PhysicsConfig,
    /// Scene contents
    pub scene: SceneDescription,
}

impl SimulationConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        self.origin.validate()?;
        self.physics.validate()?;
        self.scene.validate()?;
        if let Some(track) = &self.origin.track {
            if !self.scene.bodies.iter().any(|body| &body.name == track) {
                return Err(ConfigError::Validation(format!("tracked body '{track}' is not in the scene")));
            }
        }
        Ok(())
    }

    /// Sun, Earth and Moon with roughly real masses and orbits, plus a
    /// station riding along with the Earth as a child without physics.
    pub fn solar_system() -> Self {
        const AU: f64 = 1.496e11;
        const EARTH_MOON: f64 = 3.844e8;
        const EARTH_SPEED: f64 = 29_780.0;
        const MOON_SPEED: f64 = 1_022.0;

        let scene = SceneDescription::default()
            .with_body(
                BodyDescription::new("sun", DVec3::ZERO)
                    .with_physics(1.989e30, DVec3::ZERO, true)
                    .with_render(6.957e8, "star", 1.0),
            )
            .with_body(
                BodyDescription::new("earth", DVec3::new(AU, 0.0, 0.0))
                    .with_physics(5.972e24, DVec3::new(0.0, 0.0, EARTH_SPEED), true)
                    .with_render(6.371e6, "planet", 1.0),
            )
            .with_body(
                BodyDescription::new("moon", DVec3::new(AU + EARTH_MOON, 0.0, 0.0))
                    .with_physics(7.342e22, DVec3::new(0.0, 0.0, EARTH_SPEED + MOON_SPEED), true)
                    .with_render(1.737e6, "planet", 1.0),
            )
            .with_body(
                BodyDescription::new("station", DVec3::new(6.771e6, 0.0, 0.0))
                    .with_parent("earth")
                    .with_render(50.0, "station", 1.0),
            );

        Self {
            engine: EngineConfig::default(),
            origin: OriginConfig::default().with_track("earth"),
            physics: PhysicsConfig::default(),
            scene,
        }
    }
}

impl Config for SimulationConfig {}

fn default_true() -> bool {
    true
}

fn default_one() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.origin.scale_factor, 8000.0);
        assert_eq!(config.origin.level_names, vec!["near", "mid", "far"]);
        assert_eq!(config.origin.time_scale, 50.0);
        assert_eq!(config.physics.gravitational_constant, 6.67e-11);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_solar_system_is_valid() {
        let config = SimulationConfig::solar_system();
        assert!(config.validate().is_ok());
        assert_eq!(config.scene.bodies.len(), 4);
    }

    #[test]
    fn test_validation_failures() {
        let config = SimulationConfig {
            origin: OriginConfig::default().with_scale_factor(1.0),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let scene = SceneDescription::default()
            .with_body(BodyDescription::new("moon", DVec3::ZERO).with_parent("earth"))
            .with_body(BodyDescription::new("earth", DVec3::ZERO));
        assert!(scene.validate().is_err());

        let scene = SceneDescription::default()
            .with_body(BodyDescription::new("a", DVec3::ZERO))
            .with_body(BodyDescription::new("a", DVec3::ZERO));
        assert!(scene.validate().is_err());

        let scene = SceneDescription::default()
            .with_body(BodyDescription::new("a", DVec3::ZERO).with_physics(0.0, DVec3::ZERO, false));
        assert!(scene.validate().is_err());

        let engine = EngineConfig::new().with_fixed_timestep(0.0);
        assert!(engine.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = SimulationConfig::solar_system();
        let text = config.to_string_as(crate::config::ConfigFormat::Toml).unwrap();
        let parsed = SimulationConfig::from_str_as(&text, crate::config::ConfigFormat::Toml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_ron_round_trip() {
        let config = SimulationConfig::solar_system();
        let text = config.to_string_as(crate::config::ConfigFormat::Ron).unwrap();
        let parsed = SimulationConfig::from_str_as(&text, crate::config::ConfigFormat::Ron).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_minimal_toml() {
        let text = r#"
            [origin]
            scale_factor = 1000.0
            level_names = ["a", "b"]

            [[scene.bodies]]
            name = "rock"
            position = { x = 1.0, y = 2.0, z = 3.0 }
            physics = { mass = 5.0 }
        "#;
        let config = SimulationConfig::from_str_as(text, crate::config::ConfigFormat::Toml).unwrap();

        assert_eq!(config.origin.level_names.len(), 2);
        assert_eq!(config.origin.time_scale, 50.0);
        let rock = &config.scene.bodies[0];
        assert!(rock.active);
        assert_eq!(rock.rotation, DQuat::IDENTITY);
        let physics = rock.physics.as_ref().unwrap();
        assert!(physics.receives_gravity);
        assert!(!physics.generates_gravity);
    }
}

//! Floating origin and logarithmic scale ladder
//!
//! Level `L` renders the world shrunk by `scale_factor^L` around the origin,
//! and only draws what lies between its near and far clip distances. Level 0
//! covers everything close to the origin at full size; each further level
//! covers a band `scale_factor` times farther out.

use thiserror::Error;

use crate::ecs::{Entity, World};
use crate::foundation::math::{DVec3, Vec3};
use crate::foundation::time::TimeScale;

/// Scale ladder construction errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LadderError {
    /// The per-level factor must be finite and greater than one
    #[error("Invalid scale factor: {0} (must be finite and > 1)")]
    InvalidScaleFactor(f64),

    /// A ladder needs at least one level
    #[error("Scale ladder has no levels")]
    NoLevels,
}

/// Ordered set of scale levels with a common per-level factor
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleLadder {
    scale_factor: f64,
    names: Vec<String>,
}

impl ScaleLadder {
    /// Create a ladder with one level per name
    pub fn new(scale_factor: f64, names: Vec<String>) -> Result<Self, LadderError> {
        if !scale_factor.is_finite() || scale_factor <= 1.0 {
            return Err(LadderError::InvalidScaleFactor(scale_factor));
        }
        if names.is_empty() {
            return Err(LadderError::NoLevels);
        }
        Ok(Self { scale_factor, names })
    }

    /// Create a ladder of `levels` levels named `level0`, `level1`, ...
    pub fn with_levels(scale_factor: f64, levels: usize) -> Result<Self, LadderError> {
        Self::new(scale_factor, (0..levels).map(|i| format!("level{i}")).collect())
    }

    /// Number of levels
    pub fn level_count(&self) -> usize {
        self.names.len()
    }

    /// Index of the last level
    pub fn last_level(&self) -> usize {
        self.names.len() - 1
    }

    /// Per-level factor
    pub fn factor(&self) -> f64 {
        self.scale_factor
    }

    /// Level names
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Name of a level
    pub fn name(&self, level: usize) -> Option<&str> {
        self.names.get(level).map(String::as_str)
    }

    /// Cumulative scale of a level, `scale_factor^level`.
    ///
    /// `level` is clamped to the ladder. Computed by repeated multiplication
    /// so consecutive levels differ by exactly one factor.
    pub fn scale_factor(&self, level: usize) -> f64 {
        let level = level.min(self.last_level());
        (0..level).fold(1.0, |scale, _| scale * self.scale_factor)
    }

    /// Distance below which a level draws nothing; zero for level 0
    pub fn near_clip(&self, level: usize) -> f64 {
        if level == 0 {
            0.0
        } else {
            self.scale_factor(level)
        }
    }

    /// Distance beyond which a level draws nothing; the last level has none
    pub fn far_clip(&self, level: usize) -> Option<f64> {
        (level < self.last_level()).then(|| self.scale_factor(level + 1))
    }

    /// Scale at a fractional level, `scale_factor.powf(level)`
    pub fn display_scale(&self, level: f64) -> f64 {
        self.scale_factor.powf(level)
    }
}

/// Owner of the origin, the scale ladder and the simulation time scale
#[derive(Debug, Clone)]
pub struct OriginManager {
    origin: DVec3,
    tracked: Option<Entity>,
    ladder: ScaleLadder,
    time_scale: TimeScale,
}

impl OriginManager {
    /// Create a manager with a fixed origin at zero
    pub fn new(ladder: ScaleLadder) -> Self {
        Self {
            origin: DVec3::ZERO,
            tracked: None,
            ladder,
            time_scale: TimeScale::default(),
        }
    }

    /// Builder pattern: Set the fixed origin
    pub fn with_origin(mut self, origin: DVec3) -> Self {
        self.origin = origin;
        self
    }

    /// Builder pattern: Set the time scale
    pub fn with_time_scale(mut self, time_scale: TimeScale) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// Current origin: the tracked entity's world position, or the fixed
    /// point when nothing is tracked or the tracked entity has no transform
    pub fn origin(&self, world: &World) -> DVec3 {
        self.tracked
            .and_then(|entity| world.world_position(entity).ok())
            .unwrap_or(self.origin)
    }

    /// Fixed origin used when nothing is tracked
    pub fn fixed_origin(&self) -> DVec3 {
        self.origin
    }

    /// Set the fixed origin
    pub fn set_origin(&mut self, origin: DVec3) {
        self.origin = origin;
    }

    /// Follow an entity with the origin, or stop following with `None`
    pub fn track(&mut self, entity: Option<Entity>) {
        log::debug!("Origin tracking {:?}", entity);
        self.tracked = entity;
    }

    /// Entity the origin follows
    pub fn tracked(&self) -> Option<Entity> {
        self.tracked
    }

    /// Scale ladder
    pub fn ladder(&self) -> &ScaleLadder {
        &self.ladder
    }

    /// Replace the scale ladder. Proxy sets are rebuilt on the next update.
    pub fn set_ladder(&mut self, ladder: ScaleLadder) {
        log::info!(
            "Scale ladder changed: {} -> {} levels, factor {}",
            self.ladder.level_count(),
            ladder.level_count(),
            ladder.factor()
        );
        self.ladder = ladder;
    }

    /// Number of levels
    pub fn level_count(&self) -> usize {
        self.ladder.level_count()
    }

    /// See [`ScaleLadder::scale_factor`]
    pub fn scale_factor(&self, level: usize) -> f64 {
        self.ladder.scale_factor(level)
    }

    /// See [`ScaleLadder::near_clip`]
    pub fn near_clip(&self, level: usize) -> f64 {
        self.ladder.near_clip(level)
    }

    /// See [`ScaleLadder::far_clip`]
    pub fn far_clip(&self, level: usize) -> Option<f64> {
        self.ladder.far_clip(level)
    }

    /// See [`ScaleLadder::display_scale`]
    pub fn display_scale(&self, level: f64) -> f64 {
        self.ladder.display_scale(level)
    }

    /// Absolute position mapped into the render space of a fractional level
    pub fn local_position(&self, world: &World, position: DVec3, level: f64) -> Vec3 {
        ((position - self.origin(world)) / self.display_scale(level)).to_vec3()
    }

    /// Radius mapped into the render space of a fractional level
    pub fn local_radius(&self, radius: f64, level: f64) -> f64 {
        radius / self.display_scale(level)
    }

    /// Current time multiplier
    pub fn time_scale(&self) -> f64 {
        self.time_scale.value()
    }

    /// Speed simulated time up by one step
    pub fn increase_time_scale(&mut self) -> f64 {
        let value = self.time_scale.increase();
        log::info!("Time scale: {value}");
        value
    }

    /// Slow simulated time down by one step
    pub fn decrease_time_scale(&mut self) -> f64 {
        let value = self.time_scale.decrease();
        log::info!("Time scale: {value}");
        value
    }

    /// Simulated seconds for `real_dt` real seconds
    pub fn scaled_dt(&self, real_dt: f64) -> f64 {
        self.time_scale.scale(real_dt)
    }
}

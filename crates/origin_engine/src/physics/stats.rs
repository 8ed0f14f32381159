//! Human-readable body statistics

use std::fmt;

use super::{PhysicsBody, PhysicsError};
use crate::ecs::{Entity, World};
use crate::foundation::math::DVec3;

/// Motion of the tracked body relative to another body
#[derive(Debug, Clone, PartialEq)]
pub struct RelativeMotion {
    /// Name of the reference body
    pub name: String,
    /// Velocity difference
    pub velocity: DVec3,
    /// Position difference, when the reference body has a transform
    pub position: Option<DVec3>,
}

/// Snapshot of a body's state for display
#[derive(Debug, Clone, PartialEq)]
pub struct BodyReport {
    /// Entity name
    pub name: String,
    /// Simulation time multiplier, when known
    pub time_scale: Option<f64>,
    /// Mass
    pub mass: f64,
    /// Absolute velocity
    pub velocity: DVec3,
    /// Reference-body motion
    pub relative: Option<RelativeMotion>,
    /// Acceleration from the last step
    pub acceleration: DVec3,
    /// World position
    pub position: DVec3,
}

impl BodyReport {
    /// Capture the state of `entity`, optionally relative to `reference`
    pub fn capture(world: &World, entity: Entity, reference: Option<Entity>) -> Result<Self, PhysicsError> {
        let body = world.require::<PhysicsBody>(entity)?;
        let position = world.world_position(entity)?;

        let relative = match reference {
            Some(other) => {
                let other_body = world.require::<PhysicsBody>(other)?;
                let other_position = world.world_position(other).ok();
                Some(RelativeMotion {
                    name: world.name(other)?.to_string(),
                    velocity: body.velocity - other_body.velocity,
                    position: other_position.map(|p| position - p),
                })
            }
            None => None,
        };

        Ok(Self {
            name: world.name(entity)?.to_string(),
            time_scale: None,
            mass: body.mass(),
            velocity: body.velocity,
            relative,
            acceleration: body.diagnostics.last_acceleration,
            position,
        })
    }

    /// Builder pattern: Attach the current time scale
    pub fn with_time_scale(mut self, time_scale: f64) -> Self {
        self.time_scale = Some(time_scale);
        self
    }
}

impl fmt::Display for BodyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Object:\n\t{}", self.name)?;
        if let Some(time_scale) = self.time_scale {
            writeln!(f, "Timescale: {time_scale}")?;
        }
        writeln!(f, "Mass:\n\t{}", self.mass)?;
        writeln!(f, "Absolute Velocity:\n\t{}", self.velocity)?;
        writeln!(f, "Absolute Linear Velocity:\n\t{}", self.velocity.magnitude())?;
        if let Some(relative) = &self.relative {
            writeln!(f, "Relative Velocity ({}):\n\t{}", relative.name, relative.velocity)?;
            writeln!(
                f,
                "Relative Linear Velocity ({}):\n\t{}",
                relative.name,
                relative.velocity.magnitude()
            )?;
        }
        writeln!(f, "Absolute Accel:\n\t{}", self.acceleration)?;
        writeln!(f, "Absolute Linear Accel:\n\t{}", self.acceleration.magnitude())?;
        writeln!(f, "Coordinates:\n\t{}", self.position)?;
        if let Some(RelativeMotion {
            name,
            position: Some(position),
            ..
        }) = &self.relative
        {
            writeln!(f, "Relative Coordinates ({name}):\n\t{position}")?;
        }
        Ok(())
    }
}

//! Point-mass gravity simulation
//!
//! Bodies are plain capability records; the integrator works on an ordered
//! list of entities collected fresh from the hierarchy every tick.

pub mod body;
pub mod gravity;
pub mod integrator;
pub mod stats;

pub use body::{BodyDiagnostics, GravityFlags, PhysicsBody};
pub use gravity::{gravity_force, GRAVITATIONAL_CONSTANT};
pub use integrator::{NBodyIntegrator, TickReport};
pub use stats::{BodyReport, RelativeMotion};

use thiserror::Error;

use crate::ecs::{Entity, World, WorldError};

/// Physics errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// Mass must be positive and finite
    #[error("Invalid mass: {0} (must be positive and finite)")]
    InvalidMass(f64),

    /// Hierarchy or capability lookup failed
    #[error("World error: {0}")]
    World(#[from] WorldError),
}

impl World {
    /// Physics body of an entity
    pub fn body(&self, entity: Entity) -> Result<&PhysicsBody, WorldError> {
        self.require::<PhysicsBody>(entity)
    }

    /// Mutable physics body of an entity
    pub fn body_mut(&mut self, entity: Entity) -> Result<&mut PhysicsBody, WorldError> {
        self.require_mut::<PhysicsBody>(entity)
    }
}

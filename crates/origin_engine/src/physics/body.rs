//! Point-mass physics body

use bitflags::bitflags;

use super::PhysicsError;
use crate::foundation::math::DVec3;

bitflags! {
    /// Participation in pairwise gravity
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GravityFlags: u8 {
        /// Pulls on every other body
        const GENERATES = 1 << 0;
        /// Is pulled by generating bodies
        const RECEIVES = 1 << 1;
    }
}

impl Default for GravityFlags {
    fn default() -> Self {
        Self::RECEIVES
    }
}

/// Values recorded by the last integration step, for display only
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyDiagnostics {
    /// Acceleration applied in the last step
    pub last_acceleration: DVec3,
    /// Magnitude of `last_acceleration`
    pub last_acceleration_magnitude: f64,
    /// Speed before the last step
    pub last_speed: f64,
    /// Net force consumed by the last step
    pub last_force: DVec3,
    /// Magnitude of `last_force`
    pub last_force_magnitude: f64,
}

/// Mass, velocity and force accumulator of one entity.
///
/// The position lives in the entity's
/// [`DoubleTransform`](crate::ecs::components::DoubleTransform); the
/// integrator writes it through the world-position setter.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsBody {
    mass: f64,

    /// Velocity in world units per simulated second
    pub velocity: DVec3,

    force: DVec3,

    /// Gravity participation
    pub gravity: GravityFlags,

    /// Last-step values
    pub diagnostics: BodyDiagnostics,
}

impl PhysicsBody {
    /// Create a body that receives but does not generate gravity
    pub fn new(mass: f64, velocity: DVec3) -> Result<Self, PhysicsError> {
        Ok(Self {
            mass: validate_mass(mass)?,
            velocity,
            force: DVec3::ZERO,
            gravity: GravityFlags::default(),
            diagnostics: BodyDiagnostics::default(),
        })
    }

    /// Builder pattern: Set gravity participation
    pub fn with_gravity(mut self, gravity: GravityFlags) -> Self {
        self.gravity = gravity;
        self
    }

    /// Mass
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Set mass, rejecting non-positive or non-finite values
    pub fn set_mass(&mut self, mass: f64) -> Result<(), PhysicsError> {
        self.mass = validate_mass(mass)?;
        Ok(())
    }

    /// Whether this body pulls on others
    pub fn generates_gravity(&self) -> bool {
        self.gravity.contains(GravityFlags::GENERATES)
    }

    /// Whether this body is pulled by others
    pub fn receives_gravity(&self) -> bool {
        self.gravity.contains(GravityFlags::RECEIVES)
    }

    /// Force accumulated so far this tick
    pub fn force(&self) -> DVec3 {
        self.force
    }

    /// Add to the force accumulator
    pub fn add_force(&mut self, force: DVec3) {
        self.force += force;
    }

    /// Zero the force accumulator
    pub fn clear_force(&mut self) {
        self.force = DVec3::ZERO;
    }

    /// Linear momentum
    pub fn momentum(&self) -> DVec3 {
        self.velocity * self.mass
    }

    /// Kinetic energy
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.magnitude_squared()
    }

    /// Consume the accumulated force for one step of `dt` seconds.
    ///
    /// Returns the position offset `a dt^2 / 2 + v dt`, updates velocity,
    /// records diagnostics and zeroes the accumulator.
    pub fn step(&mut self, dt: f64) -> DVec3 {
        let acceleration = self.force / self.mass;
        let offset = acceleration * (dt * dt * 0.5) + self.velocity * dt;

        self.diagnostics = BodyDiagnostics {
            last_acceleration: acceleration,
            last_acceleration_magnitude: acceleration.magnitude(),
            last_speed: self.velocity.magnitude(),
            last_force: self.force,
            last_force_magnitude: self.force.magnitude(),
        };

        self.velocity += acceleration * dt;
        self.force = DVec3::ZERO;
        offset
    }
}

fn validate_mass(mass: f64) -> Result<f64, PhysicsError> {
    if mass.is_finite() && mass > 0.0 {
        Ok(mass)
    } else {
        Err(PhysicsError::InvalidMass(mass))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_flags_receive_only() {
        let body = PhysicsBody::new(2.0, DVec3::ZERO).unwrap();
        assert!(body.receives_gravity());
        assert!(!body.generates_gravity());

        let body = body.with_gravity(GravityFlags::all());
        assert!(body.generates_gravity());
    }

    #[test]
    fn test_mass_validation() {
        assert!(matches!(PhysicsBody::new(0.0, DVec3::ZERO), Err(PhysicsError::InvalidMass(_))));
        assert!(matches!(PhysicsBody::new(-1.0, DVec3::ZERO), Err(PhysicsError::InvalidMass(_))));
        assert!(matches!(PhysicsBody::new(f64::NAN, DVec3::ZERO), Err(PhysicsError::InvalidMass(_))));

        let mut body = PhysicsBody::new(1.0, DVec3::ZERO).unwrap();
        assert!(body.set_mass(f64::INFINITY).is_err());
        assert_eq!(body.mass(), 1.0);
    }

    #[test]
    fn test_step_semi_implicit() {
        let mut body = PhysicsBody::new(2.0, DVec3::new(1.0, 0.0, 0.0)).unwrap();
        body.add_force(DVec3::new(0.0, 4.0, 0.0));

        let offset = body.step(0.5);

        // a = (0, 2, 0); offset = a * 0.125 + v * 0.5
        assert_relative_eq!(offset, DVec3::new(0.5, 0.25, 0.0));
        assert_relative_eq!(body.velocity, DVec3::new(1.0, 1.0, 0.0));
        assert_eq!(body.force(), DVec3::ZERO);
        assert_eq!(body.diagnostics.last_speed, 1.0);
        assert_eq!(body.diagnostics.last_force, DVec3::new(0.0, 4.0, 0.0));
        assert_eq!(body.diagnostics.last_acceleration_magnitude, 2.0);
    }

    #[test]
    fn test_momentum_and_energy() {
        let body = PhysicsBody::new(4.0, DVec3::new(0.0, 3.0, 0.0)).unwrap();
        assert_eq!(body.momentum(), DVec3::new(0.0, 12.0, 0.0));
        assert_eq!(body.kinetic_energy(), 18.0);
    }
}

//! Brute-force N-body integrator
//!
//! One tick: reset every accumulator, accumulate pairwise gravity, then
//! integrate each body with a semi-implicit Euler step written back through
//! the world-position setter.

use super::gravity::{gravity_force, GRAVITATIONAL_CONSTANT};
use super::{PhysicsBody, PhysicsError};
use crate::ecs::{Entity, World};
use crate::foundation::math::DVec3;

/// Summary of one integration tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    /// Bodies integrated
    pub bodies: usize,
    /// Ordered pairs whose force was evaluated
    pub pair_evaluations: usize,
    /// Total kinetic energy after the step
    pub kinetic_energy: f64,
    /// Total linear momentum after the step
    pub momentum: DVec3,
}

/// Pairwise gravity integrator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NBodyIntegrator {
    gravitational_constant: f64,
}

impl Default for NBodyIntegrator {
    fn default() -> Self {
        Self::new(GRAVITATIONAL_CONSTANT)
    }
}

impl NBodyIntegrator {
    /// Create an integrator using the given gravitational constant
    pub const fn new(gravitational_constant: f64) -> Self {
        Self { gravitational_constant }
    }

    /// Gravitational constant in use
    pub fn gravitational_constant(&self) -> f64 {
        self.gravitational_constant
    }

    /// Zero the force accumulator of every body
    pub fn reset_forces(&self, world: &mut World, bodies: &[Entity]) -> Result<(), PhysicsError> {
        for &entity in bodies {
            world.require_mut::<PhysicsBody>(entity)?.clear_force();
        }
        Ok(())
    }

    /// Accumulate gravity over every ordered pair `(i, j)` with `i != j`.
    ///
    /// For each generating body `i` and every other body `j`, the force on
    /// `i` toward `j` is added to `i` if it receives gravity and subtracted
    /// from `j` if it receives gravity. Two mutually generating bodies are
    /// therefore each visited twice, and their totals are exact negatives.
    ///
    /// Returns the number of pair evaluations.
    pub fn accumulate_forces(&self, world: &mut World, bodies: &[Entity]) -> Result<usize, PhysicsError> {
        struct Sample {
            position: DVec3,
            mass: f64,
            generates: bool,
            receives: bool,
        }

        let samples = bodies
            .iter()
            .map(|&entity| -> Result<Sample, PhysicsError> {
                let body = world.require::<PhysicsBody>(entity)?;
                Ok(Sample {
                    position: world.world_position(entity)?,
                    mass: body.mass(),
                    generates: body.generates_gravity(),
                    receives: body.receives_gravity(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut forces = vec![DVec3::ZERO; samples.len()];
        let mut evaluations = 0;
        for (i, source) in samples.iter().enumerate() {
            if !source.generates {
                continue;
            }
            for (j, target) in samples.iter().enumerate() {
                if i == j {
                    continue;
                }
                let force = gravity_force(
                    self.gravitational_constant,
                    source.mass,
                    source.position,
                    target.mass,
                    target.position,
                );
                evaluations += 1;

                if source.receives {
                    forces[i] += force;
                }
                if target.receives {
                    forces[j] -= force;
                }
            }
        }

        for (&entity, force) in bodies.iter().zip(forces) {
            if !force.is_finite() {
                log::warn!("Non-finite gravity on {:?} ({}): {}", entity, world.name(entity)?, force);
            }
            world.require_mut::<PhysicsBody>(entity)?.add_force(force);
        }

        Ok(evaluations)
    }

    /// Advance every body by `dt` seconds using its accumulated force
    pub fn integrate(&self, world: &mut World, bodies: &[Entity], dt: f64) -> Result<(), PhysicsError> {
        for &entity in bodies {
            let offset = world.require_mut::<PhysicsBody>(entity)?.step(dt);
            let position = world.world_position(entity)?;
            world.set_world_position(entity, position + offset)?;
        }
        Ok(())
    }

    /// Run a full tick: reset, accumulate, integrate
    pub fn tick(&self, world: &mut World, bodies: &[Entity], dt: f64) -> Result<TickReport, PhysicsError> {
        self.reset_forces(world, bodies)?;
        let pair_evaluations = self.accumulate_forces(world, bodies)?;
        self.integrate(world, bodies, dt)?;

        let mut report = TickReport {
            bodies: bodies.len(),
            pair_evaluations,
            ..TickReport::default()
        };
        for &entity in bodies {
            let body = world.require::<PhysicsBody>(entity)?;
            report.kinetic_energy += body.kinetic_energy();
            report.momentum += body.momentum();
        }

        log::trace!(
            "Physics tick: {} bodies, {} pairs, dt {}",
            report.bodies,
            report.pair_evaluations,
            dt
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::DoubleTransform;
    use crate::physics::GravityFlags;
    use approx::assert_relative_eq;

    fn spawn(world: &mut World, name: &str, position: DVec3, mass: f64, gravity: GravityFlags) -> Entity {
        let entity = world.create_entity(name);
        world
            .add_component(entity, DoubleTransform::from_position(position))
            .unwrap();
        world
            .add_component(entity, PhysicsBody::new(mass, DVec3::ZERO).unwrap().with_gravity(gravity))
            .unwrap();
        entity
    }

    #[test]
    fn test_mutual_forces_are_opposite() {
        let mut world = World::new();
        let a = spawn(&mut world, "a", DVec3::ZERO, 5.0e10, GravityFlags::all());
        let b = spawn(&mut world, "b", DVec3::new(1000.0, 250.0, -30.0), 3.0e8, GravityFlags::all());
        let integrator = NBodyIntegrator::default();

        let pairs = integrator.accumulate_forces(&mut world, &[a, b]).unwrap();
        assert_eq!(pairs, 2);

        let force_a = world.body(a).unwrap().force();
        let force_b = world.body(b).unwrap().force();
        assert_eq!(force_a, -force_b);
        assert!(force_a.x > 0.0);
    }

    #[test]
    fn test_one_way_gravity() {
        let mut world = World::new();
        let star = spawn(&mut world, "star", DVec3::ZERO, 1.0e20, GravityFlags::GENERATES);
        let probe = spawn(&mut world, "probe", DVec3::new(1.0e6, 0.0, 0.0), 1.0, GravityFlags::RECEIVES);
        let integrator = NBodyIntegrator::default();

        let pairs = integrator.accumulate_forces(&mut world, &[star, probe]).unwrap();

        assert_eq!(pairs, 1);
        assert_eq!(world.body(star).unwrap().force(), DVec3::ZERO);
        // 6.67e-11 * 1e20 / 1e12 toward the star.
        assert_relative_eq!(world.body(probe).unwrap().force(), DVec3::new(-6.67e-3, 0.0, 0.0), epsilon = 1e-15);
    }

    #[test]
    fn test_tick_moves_and_clears() {
        let mut world = World::new();
        let star = spawn(&mut world, "star", DVec3::ZERO, 1.0e20, GravityFlags::GENERATES);
        let probe = spawn(&mut world, "probe", DVec3::new(1.0e6, 0.0, 0.0), 1.0, GravityFlags::RECEIVES);
        let integrator = NBodyIntegrator::default();

        let report = integrator.tick(&mut world, &[star, probe], 10.0).unwrap();
        let body = world.body(probe).unwrap();

        assert_eq!(report.bodies, 2);
        assert_eq!(body.force(), DVec3::ZERO);
        assert_relative_eq!(body.velocity.x, -6.67e-2, epsilon = 1e-12);
        assert_relative_eq!(world.world_position(probe).unwrap().x, 1.0e6 - 0.5 * 6.67e-3 * 100.0, epsilon = 1e-6);
        assert_eq!(world.world_position(star).unwrap(), DVec3::ZERO);
    }

    #[test]
    fn test_non_receivers_keep_velocity() {
        let mut world = World::new();
        let a = spawn(&mut world, "a", DVec3::ZERO, 1.0e20, GravityFlags::GENERATES);
        let b = spawn(&mut world, "b", DVec3::new(10.0, 0.0, 0.0), 1.0e20, GravityFlags::GENERATES);
        let integrator = NBodyIntegrator::default();

        integrator.tick(&mut world, &[a, b], 1.0).unwrap();

        assert_eq!(world.body(a).unwrap().velocity, DVec3::ZERO);
        assert_eq!(world.body(b).unwrap().velocity, DVec3::ZERO);
    }

    #[test]
    fn test_missing_body_is_reported() {
        let mut world = World::new();
        let bare = world.create_entity("bare");
        let integrator = NBodyIntegrator::default();

        assert!(matches!(
            integrator.tick(&mut world, &[bare], 1.0),
            Err(PhysicsError::World(_))
        ));
    }
}

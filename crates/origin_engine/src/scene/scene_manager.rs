//! Space scene: the single owner of everything one tick touches
//!
//! A tick runs in a fixed order:
//! 1. collect the active bodies from the hierarchy,
//! 2. integrate gravity over them,
//! 3. re-evaluate every spatial object's proxies against the new poses.
//!
//! Proxies therefore always show the post-integration state of the tick.

use std::collections::HashMap;

use thiserror::Error;

use super::origin::{LadderError, OriginManager, ScaleLadder};
use super::proxy::{ProxyBackend, ProxyError, ProxyRegistry};
use super::proxy_lod::{ProxySelector, ProxyUpdate};
use crate::core::config::{BodyDescription, ConfigError, SimulationConfig};
use crate::ecs::components::{DoubleTransform, SpatialObject};
use crate::ecs::query::{self, Visit};
use crate::ecs::{Entity, World, WorldError};
use crate::foundation::time::TimeScale;
use crate::physics::{BodyReport, GravityFlags, NBodyIntegrator, PhysicsBody, PhysicsError, TickReport};

/// Scene errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// Hierarchy or capability lookup failed
    #[error("World error: {0}")]
    World(#[from] WorldError),

    /// Physics failure
    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),

    /// Proxy backend failure
    #[error("Proxy error: {0}")]
    Proxy(#[from] ProxyError),

    /// Invalid scale ladder
    #[error("Scale ladder error: {0}")]
    Ladder(#[from] LadderError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A body description names a parent that does not exist
    #[error("Body '{body}' names unknown parent '{parent}'")]
    UnknownParent {
        /// Body being spawned
        body: String,
        /// Missing parent name
        parent: String,
    },

    /// Origin tracking names a body that does not exist
    #[error("Unknown body: {0}")]
    UnknownBody(String),
}

/// Outcome of one scene tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SceneTick {
    /// Simulated seconds advanced
    pub sim_dt: f64,
    /// Integrator summary
    pub physics: TickReport,
    /// Proxy churn
    pub proxies: ProxyUpdate,
}

/// World, origin manager, integrator, selector and proxy backend
pub struct SpaceScene<B: ProxyBackend = ProxyRegistry> {
    world: World,
    origin: OriginManager,
    integrator: NBodyIntegrator,
    selector: ProxySelector,
    backend: B,
    ticks: u64,
    sim_time: f64,
}

impl<B: ProxyBackend> SpaceScene<B> {
    /// Create an empty scene
    pub fn new(origin: OriginManager, integrator: NBodyIntegrator, backend: B) -> Self {
        Self {
            world: World::new(),
            origin,
            integrator,
            selector: ProxySelector::new(),
            backend,
            ticks: 0,
            sim_time: 0.0,
        }
    }

    /// Build a scene from a validated configuration.
    ///
    /// Prefab names are resolved through the backend.
    pub fn from_config(config: &SimulationConfig, backend: B) -> Result<Self, SceneError> {
        config.validate()?;

        let ladder = ScaleLadder::new(config.origin.scale_factor, config.origin.level_names.clone())?;
        let origin = OriginManager::new(ladder)
            .with_origin(config.origin.origin)
            .with_time_scale(TimeScale::new(config.origin.time_scale));
        let integrator = NBodyIntegrator::new(config.physics.gravitational_constant);
        let mut scene = Self::new(origin, integrator, backend);

        let mut names = HashMap::new();
        for description in &config.scene.bodies {
            let parent = match &description.parent {
                Some(parent) => Some(*names.get(parent.as_str()).ok_or_else(|| SceneError::UnknownParent {
                    body: description.name.clone(),
                    parent: parent.clone(),
                })?),
                None => None,
            };
            let entity = scene.spawn_body(description, parent)?;
            names.insert(description.name.as_str(), entity);
        }

        if let Some(track) = &config.origin.track {
            let entity = names
                .get(track.as_str())
                .copied()
                .ok_or_else(|| SceneError::UnknownBody(track.clone()))?;
            scene.origin.track(Some(entity));
        }

        log::info!(
            "Scene built: {} bodies, {} levels, factor {}",
            scene.world.len(),
            scene.origin.level_count(),
            scene.origin.ladder().factor()
        );
        Ok(scene)
    }

    /// Spawn one described body, optionally under `parent`
    pub fn spawn_body(&mut self, description: &BodyDescription, parent: Option<Entity>) -> Result<Entity, SceneError> {
        let entity = match parent {
            Some(parent) => self.world.create_child(description.name.clone(), parent)?,
            None => self.world.create_entity(description.name.clone()),
        };
        self.world.set_active(entity, description.active)?;
        self.world.add_component(
            entity,
            DoubleTransform::new(description.position, description.rotation),
        )?;

        if let Some(physics) = &description.physics {
            let mut gravity = GravityFlags::empty();
            gravity.set(GravityFlags::GENERATES, physics.generates_gravity);
            gravity.set(GravityFlags::RECEIVES, physics.receives_gravity);
            let body = PhysicsBody::new(physics.mass, physics.velocity)?.with_gravity(gravity);
            self.world.add_component(entity, body)?;
        }

        if let Some(render) = &description.render {
            let mut object = SpatialObject::new(render.radius).with_hidden(render.hidden);
            object.prefab_radius = render.prefab_radius;
            if let Some(prefab) = &render.prefab {
                object.prefab = Some(self.backend.resolve_prefab(prefab)?);
            }
            self.world.add_component(entity, object)?;
        }

        log::debug!("Spawned '{}' as {:?}", description.name, entity);
        Ok(entity)
    }

    /// Advance by `real_dt` real seconds scaled by the time multiplier
    pub fn tick(&mut self, real_dt: f64) -> Result<SceneTick, SceneError> {
        self.advance(self.origin.scaled_dt(real_dt))
    }

    /// Advance by `sim_dt` simulated seconds
    pub fn advance(&mut self, sim_dt: f64) -> Result<SceneTick, SceneError> {
        let bodies = query::collect_active_bodies(&self.world);
        let physics = self.integrator.tick(&mut self.world, &bodies, sim_dt)?;
        let proxies = self
            .selector
            .update_all(&mut self.world, &self.origin, &mut self.backend)?;

        self.ticks += 1;
        self.sim_time += sim_dt;
        Ok(SceneTick {
            sim_dt,
            physics,
            proxies,
        })
    }

    /// Remove an entity and its subtree, releasing their proxies.
    ///
    /// Proxies are released before anything leaves the world. If the backend
    /// refuses one, the subtree stays in place with the unreleased handles and
    /// the despawn can be retried.
    pub fn despawn(&mut self, entity: Entity) -> Result<usize, SceneError> {
        let mut released = 0;
        for holder in query::collect_with::<SpatialObject>(&self.world, &[entity], Visit::All) {
            let object = self.world.require_mut::<SpatialObject>(holder)?;
            released += ProxySelector::release(object, &mut self.backend)?;
        }
        self.world.despawn(entity)?;

        if self.origin.tracked().is_some_and(|tracked| !self.world.contains(tracked)) {
            self.origin.track(None);
        }
        Ok(released)
    }

    /// Statistics for `entity`, optionally relative to `reference`
    pub fn body_report(&self, entity: Entity, reference: Option<Entity>) -> Result<BodyReport, SceneError> {
        Ok(BodyReport::capture(&self.world, entity, reference)?.with_time_scale(self.origin.time_scale()))
    }

    /// Entity by name
    pub fn find(&self, name: &str) -> Option<Entity> {
        self.world.find_by_name(name)
    }

    /// Entity world
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable entity world
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Origin manager
    pub fn origin(&self) -> &OriginManager {
        &self.origin
    }

    /// Mutable origin manager
    pub fn origin_mut(&mut self) -> &mut OriginManager {
        &mut self.origin
    }

    /// Integrator
    pub fn integrator(&self) -> &NBodyIntegrator {
        &self.integrator
    }

    /// Proxy backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable proxy backend
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Ticks run so far
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Simulated seconds elapsed
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }
}

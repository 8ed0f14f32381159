//! Multi-scale proxy selection
//!
//! For every scale level an object either overlaps the level's distance band
//! and gets a proxy placed in that level's shrunken local space, or it is
//! clipped and any proxy it had on that level is destroyed. The band test
//! uses the axis-aligned box around the object, which over-reports overlap
//! near the band corners; objects may briefly hold proxies on two levels.

use super::origin::{OriginManager, ScaleLadder};
use super::proxy::{ProxyBackend, ProxyPlacement, ProxySet};
use super::SceneError;
use crate::ecs::components::{DoubleTransform, SpatialObject};
use crate::ecs::{query, Entity, World};
use crate::foundation::math::{DQuat, DVec3};

/// Proxy churn from one update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProxyUpdate {
    /// Proxies instantiated
    pub created: usize,
    /// Proxies released
    pub destroyed: usize,
    /// Proxies (re)placed
    pub placed: usize,
}

impl std::ops::AddAssign for ProxyUpdate {
    fn add_assign(&mut self, other: Self) {
        self.created += other.created;
        self.destroyed += other.destroyed;
        self.placed += other.placed;
    }
}

/// Whether an object at `abs_diff` (absolute per-axis offset from the
/// origin) with `radius` is outside the band of `level`.
///
/// Clipped when the whole box is nearer than the near clip on every axis, or
/// when, for any level but the last, the box lies beyond the far clip on
/// any axis.
pub fn is_clipped(ladder: &ScaleLadder, level: usize, abs_diff: DVec3, radius: f64) -> bool {
    let extent = DVec3::splat(radius);
    let abs_min = abs_diff - extent;
    let abs_max = abs_diff + extent;

    let near = ladder.near_clip(level);
    let too_near = abs_max.x < near && abs_max.y < near && abs_max.z < near;
    let too_far = ladder
        .far_clip(level)
        .is_some_and(|far| abs_min.x > far || abs_min.y > far || abs_min.z > far);

    too_near || too_far
}

/// Placement of an unclipped object on `level`
pub fn placement(
    ladder: &ScaleLadder,
    level: usize,
    diff: DVec3,
    rotation: DQuat,
    object: &SpatialObject,
) -> ProxyPlacement {
    let level_scale = ladder.scale_factor(level);
    ProxyPlacement {
        level,
        uniform_scale: object.radius / (object.prefab_radius * level_scale),
        local_position: diff / level_scale,
        local_rotation: rotation.normalized(),
    }
}

/// Keeps every spatial object's proxy set in step with the scale ladder
#[derive(Debug, Clone, Copy, Default)]
pub struct ProxySelector;

impl ProxySelector {
    /// Create a selector
    pub fn new() -> Self {
        Self
    }

    /// Re-evaluate the proxies of one spatial object.
    ///
    /// Hidden objects, objects inactive in the hierarchy and objects without
    /// a transform are clipped on every level. A proxy set whose length
    /// differs from the level count is torn down and rebuilt.
    pub fn update_proxies<B: ProxyBackend + ?Sized>(
        &self,
        world: &mut World,
        entity: Entity,
        origin: &OriginManager,
        backend: &mut B,
    ) -> Result<ProxyUpdate, SceneError> {
        let ladder = origin.ladder();
        let levels = ladder.level_count();
        let visible = !world.require::<SpatialObject>(entity)?.hidden
            && world.is_active_in_hierarchy(entity)?
            && world.has_component::<DoubleTransform>(entity);

        let (diff, rotation) = if visible {
            (
                world.world_position(entity)? - origin.origin(world),
                world.world_rotation(entity)?,
            )
        } else {
            (DVec3::ZERO, DQuat::IDENTITY)
        };
        let abs_diff = diff.abs();

        let object = world.require_mut::<SpatialObject>(entity)?;
        let mut update = ProxyUpdate::default();

        if object.proxies.len() != levels {
            // Old length is kept until every handle is destroyed
            update.destroyed += destroy_all(&mut object.proxies, backend)?;
            object.proxies.reset(levels);
        }

        for level in 0..levels {
            if !visible || is_clipped(ladder, level, abs_diff, object.radius) {
                if let Some(proxy) = object.proxies.take(level) {
                    if let Err(err) = backend.destroy_proxy(proxy) {
                        object.proxies.set(level, proxy);
                        return Err(err.into());
                    }
                    update.destroyed += 1;
                }
                continue;
            }

            let Some(prefab) = object.prefab else {
                continue;
            };
            let proxy = match object.proxies.get(level) {
                Some(proxy) => proxy,
                None => {
                    let proxy = backend.create_proxy(prefab, level)?;
                    object.proxies.set(level, proxy);
                    update.created += 1;
                    proxy
                }
            };
            backend.set_proxy_local_transform(proxy, &placement(ladder, level, diff, rotation, object))?;
            update.placed += 1;
        }

        Ok(update)
    }

    /// Update every spatial object, depth-first, inactive subtrees included
    /// so their proxies are released
    pub fn update_all<B: ProxyBackend + ?Sized>(
        &self,
        world: &mut World,
        origin: &OriginManager,
        backend: &mut B,
    ) -> Result<ProxyUpdate, SceneError> {
        let mut total = ProxyUpdate::default();
        for entity in query::collect_spatial_objects(world) {
            total += self.update_proxies(world, entity, origin, backend)?;
        }

        if total.created > 0 || total.destroyed > 0 {
            log::debug!("Proxies: {} created, {} destroyed", total.created, total.destroyed);
        }
        log::trace!("Proxies placed: {}", total.placed);
        Ok(total)
    }

    /// Destroy every proxy held by `object`.
    ///
    /// Proxies the backend fails to destroy stay in the set and the first
    /// failure is returned once every other proxy has been attempted.
    pub fn release<B: ProxyBackend + ?Sized>(object: &mut SpatialObject, backend: &mut B) -> Result<usize, SceneError> {
        let destroyed = destroy_all(&mut object.proxies, backend)?;
        object.proxies.reset(0);
        Ok(destroyed)
    }
}

/// Destroy every live proxy in `proxies`, leaving failed handles in place
fn destroy_all<B: ProxyBackend + ?Sized>(proxies: &mut ProxySet, backend: &mut B) -> Result<usize, SceneError> {
    let mut destroyed = 0;
    let mut first_error = None;
    for level in 0..proxies.len() {
        let Some(proxy) = proxies.take(level) else {
            continue;
        };
        match backend.destroy_proxy(proxy) {
            Ok(()) => destroyed += 1,
            Err(err) => {
                log::warn!("Failed to destroy proxy {proxy:?} on level {level}: {err}");
                proxies.set(level, proxy);
                first_error.get_or_insert(err);
            }
        }
    }

    match first_error {
        Some(err) => Err(err.into()),
        None => Ok(destroyed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::collections::PrefabHandle;
    use crate::scene::proxy::test_support::FlakyRegistry;
    use crate::scene::proxy::ProxyRegistry;
    use approx::assert_relative_eq;

    fn setup(position: DVec3, radius: f64) -> (World, Entity, OriginManager, ProxyRegistry, PrefabHandle) {
        let mut registry = ProxyRegistry::new();
        let prefab = registry.register_prefab("sphere");
        let mut world = World::new();
        let entity = world.create_entity("planet");
        world
            .add_component(entity, DoubleTransform::from_position(position))
            .unwrap();
        world
            .add_component(entity, SpatialObject::new(radius).with_prefab(prefab, 0.5))
            .unwrap();
        let origin = OriginManager::new(ScaleLadder::with_levels(1000.0, 3).unwrap());
        (world, entity, origin, registry, prefab)
    }

    fn live_levels(world: &World, entity: Entity) -> Vec<usize> {
        let proxies = &world.spatial_object(entity).unwrap().proxies;
        (0..proxies.len()).filter(|&level| proxies.get(level).is_some()).collect()
    }

    #[test]
    fn test_clip_band_edges() {
        let ladder = ScaleLadder::with_levels(1000.0, 3).unwrap();

        // At the origin only level 0 draws.
        assert!(!is_clipped(&ladder, 0, DVec3::ZERO, 1.0));
        assert!(is_clipped(&ladder, 1, DVec3::ZERO, 1.0));
        assert!(is_clipped(&ladder, 2, DVec3::ZERO, 1.0));

        // Beyond the far clip of level 0 on one axis.
        let far = DVec3::new(0.0, 0.0, 1002.0);
        assert!(is_clipped(&ladder, 0, far, 1.0));
        assert!(!is_clipped(&ladder, 1, far, 1.0));

        // The last level has no far clip.
        assert!(!is_clipped(&ladder, 2, DVec3::splat(1.0e300), 1.0));
    }

    #[test]
    fn test_proxy_placement_values() {
        let (mut world, entity, origin, mut registry, _) = setup(DVec3::new(5000.0, 0.0, 0.0), 100.0);

        let update = ProxySelector::new()
            .update_proxies(&mut world, entity, &origin, &mut registry)
            .unwrap();
        assert_eq!(update, ProxyUpdate { created: 1, destroyed: 0, placed: 1 });
        assert_eq!(live_levels(&world, entity), vec![1]);

        let proxy = world.spatial_object(entity).unwrap().proxies.get(1).unwrap();
        let placed = registry.proxy(proxy).unwrap().placement.unwrap();
        assert_relative_eq!(placed.uniform_scale, 100.0 / (0.5 * 1000.0));
        assert_relative_eq!(placed.local_position, DVec3::new(5.0, 0.0, 0.0));
        assert_eq!(placed.local_rotation, DQuat::IDENTITY);
    }

    #[test]
    fn test_proxy_created_once_then_moved() {
        let (mut world, entity, origin, mut registry, _) = setup(DVec3::new(10.0, 0.0, 0.0), 1.0);
        let selector = ProxySelector::new();

        selector.update_proxies(&mut world, entity, &origin, &mut registry).unwrap();
        let first = world.spatial_object(entity).unwrap().proxies.get(0);
        world.set_world_position(entity, DVec3::new(20.0, 0.0, 0.0)).unwrap();
        let update = selector.update_proxies(&mut world, entity, &origin, &mut registry).unwrap();

        assert_eq!(update.created, 0);
        assert_eq!(world.spatial_object(entity).unwrap().proxies.get(0), first);
        assert_eq!(registry.created_total(), 1);
    }

    #[test]
    fn test_moving_out_destroys_proxy() {
        let (mut world, entity, origin, mut registry, _) = setup(DVec3::ZERO, 1.0);
        let selector = ProxySelector::new();

        selector.update_proxies(&mut world, entity, &origin, &mut registry).unwrap();
        assert_eq!(live_levels(&world, entity), vec![0]);

        world.set_world_position(entity, DVec3::new(0.0, 5.0e6, 0.0)).unwrap();
        let update = selector.update_proxies(&mut world, entity, &origin, &mut registry).unwrap();

        assert_eq!(update, ProxyUpdate { created: 1, destroyed: 1, placed: 1 });
        assert_eq!(live_levels(&world, entity), vec![2]);
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_hidden_and_inactive_are_clipped() {
        let (mut world, entity, origin, mut registry, _) = setup(DVec3::ZERO, 1.0);
        let selector = ProxySelector::new();
        selector.update_proxies(&mut world, entity, &origin, &mut registry).unwrap();

        world.spatial_object_mut(entity).unwrap().set_hidden(true);
        selector.update_proxies(&mut world, entity, &origin, &mut registry).unwrap();
        assert_eq!(registry.live_count(), 0);

        world.spatial_object_mut(entity).unwrap().set_hidden(false);
        world.set_active(entity, false).unwrap();
        let update = selector.update_all(&mut world, &origin, &mut registry).unwrap();
        assert_eq!(update.created, 0);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_without_prefab_no_proxies() {
        let (mut world, entity, origin, mut registry, _) = setup(DVec3::ZERO, 1.0);
        world.spatial_object_mut(entity).unwrap().prefab = None;

        let update = ProxySelector::new()
            .update_proxies(&mut world, entity, &origin, &mut registry)
            .unwrap();
        assert_eq!(update, ProxyUpdate::default());
        assert_eq!(world.spatial_object(entity).unwrap().proxies.len(), 3);
    }

    #[test]
    fn test_ladder_resize_rebuilds_set() {
        let (mut world, entity, mut origin, mut registry, _) = setup(DVec3::ZERO, 1.0);
        let selector = ProxySelector::new();
        selector.update_proxies(&mut world, entity, &origin, &mut registry).unwrap();

        origin.set_ladder(ScaleLadder::with_levels(1000.0, 4).unwrap());
        let update = selector.update_proxies(&mut world, entity, &origin, &mut registry).unwrap();

        assert_eq!(update, ProxyUpdate { created: 1, destroyed: 1, placed: 1 });
        assert_eq!(world.spatial_object(entity).unwrap().proxies.len(), 4);
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn test_origin_shift_moves_band() {
        let (mut world, entity, mut origin, mut registry, _) = setup(DVec3::new(3.0e6, 0.0, 0.0), 1.0);
        origin.set_origin(DVec3::new(3.0e6, 0.0, 0.0));

        ProxySelector::new()
            .update_proxies(&mut world, entity, &origin, &mut registry)
            .unwrap();
        assert_eq!(live_levels(&world, entity), vec![0]);
    }

    #[test]
    fn test_failed_teardown_is_retried() {
        let (mut world, entity, mut origin, registry, _) = setup(DVec3::ZERO, 1.0);
        let mut backend = FlakyRegistry::new(registry);
        let selector = ProxySelector::new();
        selector.update_all(&mut world, &origin, &mut backend).unwrap();
        let held = world.spatial_object(entity).unwrap().proxies.get(0).unwrap();

        origin.set_ladder(ScaleLadder::with_levels(1000.0, 4).unwrap());
        backend.failing_destroys = 1;
        assert!(selector.update_all(&mut world, &origin, &mut backend).is_err());

        let proxies = &world.spatial_object(entity).unwrap().proxies;
        assert_eq!(proxies.len(), 3);
        assert_eq!(proxies.get(0), Some(held));
        assert!(backend.registry.proxy(held).is_some());

        let update = selector.update_all(&mut world, &origin, &mut backend).unwrap();
        assert_eq!(update, ProxyUpdate { created: 1, destroyed: 1, placed: 1 });
        assert_eq!(world.spatial_object(entity).unwrap().proxies.len(), 4);
        assert_eq!(backend.registry.live_count(), 1);
        assert!(backend.registry.proxy(held).is_none());
    }

    #[test]
    fn test_failed_clip_keeps_proxy() {
        let (mut world, entity, origin, registry, _) = setup(DVec3::ZERO, 1.0);
        let mut backend = FlakyRegistry::new(registry);
        let selector = ProxySelector::new();
        selector.update_proxies(&mut world, entity, &origin, &mut backend).unwrap();

        world.set_world_position(entity, DVec3::new(5000.0, 0.0, 0.0)).unwrap();
        backend.failing_destroys = 1;
        assert!(selector.update_proxies(&mut world, entity, &origin, &mut backend).is_err());
        assert_eq!(live_levels(&world, entity), vec![0]);

        let update = selector.update_proxies(&mut world, entity, &origin, &mut backend).unwrap();
        assert_eq!(update.destroyed, 1);
        assert_eq!(live_levels(&world, entity), vec![1]);
        assert_eq!(backend.registry.live_count(), 1);
    }

    #[test]
    fn test_release_keeps_failed_handles() {
        let (mut world, entity, origin, registry, _) = setup(DVec3::ZERO, 1.0);
        let mut backend = FlakyRegistry::new(registry);
        ProxySelector::new()
            .update_proxies(&mut world, entity, &origin, &mut backend)
            .unwrap();

        backend.failing_destroys = 1;
        let object = world.get_component_mut::<SpatialObject>(entity).unwrap();
        assert!(ProxySelector::release(object, &mut backend).is_err());
        assert_eq!(object.proxies.live_count(), 1);

        assert_eq!(ProxySelector::release(object, &mut backend).unwrap(), 1);
        assert_eq!(object.proxies.len(), 0);
        assert_eq!(backend.registry.live_count(), 0);
    }
}

//! Hierarchy traversals
//!
//! Per-tick collections are rebuilt from the hierarchy every call; nothing
//! here is cached across ticks.

use super::{Component, Entity, World};
use crate::ecs::components::{DoubleTransform, SpatialObject};
use crate::physics::PhysicsBody;

/// Whether inactive subtrees are descended into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Skip an inactive entity and everything under it
    ActiveOnly,
    /// Visit every entity
    All,
}

/// Depth-first pre-order walk from `start`, children in insertion order
pub fn depth_first_from(world: &World, start: &[Entity], visit: Visit) -> Vec<Entity> {
    let mut order = Vec::new();
    let mut stack: Vec<Entity> = start.iter().rev().copied().collect();
    while let Some(entity) = stack.pop() {
        if visit == Visit::ActiveOnly && !world.is_active(entity).unwrap_or(false) {
            continue;
        }
        order.push(entity);
        stack.extend(world.children(entity).iter().rev().copied());
    }
    order
}

/// Depth-first pre-order walk over the whole world
pub fn depth_first(world: &World, visit: Visit) -> Vec<Entity> {
    depth_first_from(world, world.roots(), visit)
}

/// Entities under `start` carrying component `T`, in traversal order
pub fn collect_with<T: Component>(world: &World, start: &[Entity], visit: Visit) -> Vec<Entity> {
    depth_first_from(world, start, visit)
        .into_iter()
        .filter(|&entity| world.has_component::<T>(entity))
        .collect()
}

/// Active entities carrying both a physics body and a transform.
///
/// Inactive subtrees are skipped entirely. The order is stable for a given
/// hierarchy, which keeps gravity accumulation deterministic.
pub fn collect_active_bodies(world: &World) -> Vec<Entity> {
    collect_active_bodies_under(world, world.roots())
}

/// [`collect_active_bodies`] restricted to the subtrees under `roots`
pub fn collect_active_bodies_under(world: &World, roots: &[Entity]) -> Vec<Entity> {
    collect_with::<PhysicsBody>(world, roots, Visit::ActiveOnly)
        .into_iter()
        .filter(|&entity| world.has_component::<DoubleTransform>(entity))
        .collect()
}

/// Every spatial object, inactive ones included
pub fn collect_spatial_objects(world: &World) -> Vec<Entity> {
    collect_with::<SpatialObject>(world, world.roots(), Visit::All)
}

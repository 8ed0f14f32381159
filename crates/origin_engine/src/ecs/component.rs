//! Component trait and implementations

use slotmap::SecondaryMap;

use super::{Entity, World};
use crate::ecs::components::{DoubleTransform, SpatialObject};
use crate::physics::PhysicsBody;

/// A capability record that can be attached to an entity.
///
/// Each component type owns one typed table inside the [`World`]; lookups
/// are a keyed access into that table rather than a search by type.
pub trait Component: Sized + 'static {
    /// Human-readable name used in error messages
    const NAME: &'static str;

    /// The table holding this component type
    fn storage(world: &World) -> &SecondaryMap<Entity, Self>;

    /// Mutable access to the table holding this component type
    fn storage_mut(world: &mut World) -> &mut SecondaryMap<Entity, Self>;
}

impl Component for DoubleTransform {
    const NAME: &'static str = "DoubleTransform";

    fn storage(world: &World) -> &SecondaryMap<Entity, Self> {
        &world.transforms
    }

    fn storage_mut(world: &mut World) -> &mut SecondaryMap<Entity, Self> {
        &mut world.transforms
    }
}

impl Component for PhysicsBody {
    const NAME: &'static str = "PhysicsBody";

    fn storage(world: &World) -> &SecondaryMap<Entity, Self> {
        &world.bodies
    }

    fn storage_mut(world: &mut World) -> &mut SecondaryMap<Entity, Self> {
        &mut world.bodies
    }
}

impl Component for SpatialObject {
    const NAME: &'static str = "SpatialObject";

    fn storage(world: &World) -> &SecondaryMap<Entity, Self> {
        &world.spatial_objects
    }

    fn storage_mut(world: &mut World) -> &mut SecondaryMap<Entity, Self> {
        &mut world.spatial_objects
    }
}

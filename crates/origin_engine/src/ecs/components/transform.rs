//! Parent-relative double-precision transform
//!
//! Only local values are stored. World pose is composed up the parent chain
//! on every query and world setters back-solve the local values, so moving
//! a parent carries its children without touching them.

use serde::{Deserialize, Serialize};

use crate::ecs::world::{WorldError, MAX_HIERARCHY_DEPTH};
use crate::ecs::{Entity, World};
use crate::foundation::math::{DPose, DQuat, DVec3};

/// Local position and rotation relative to the parent transform
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DoubleTransform {
    /// Position in the parent's frame
    pub local_position: DVec3,

    /// Rotation relative to the parent's frame
    pub local_rotation: DQuat,
}

impl DoubleTransform {
    /// Create from local position and rotation
    pub const fn new(local_position: DVec3, local_rotation: DQuat) -> Self {
        Self {
            local_position,
            local_rotation,
        }
    }

    /// Create from local position only
    pub fn from_position(local_position: DVec3) -> Self {
        Self {
            local_position,
            ..Default::default()
        }
    }

    /// Builder pattern: Set local position
    pub fn with_position(mut self, local_position: DVec3) -> Self {
        self.local_position = local_position;
        self
    }

    /// Builder pattern: Set local rotation
    pub fn with_rotation(mut self, local_rotation: DQuat) -> Self {
        self.local_rotation = local_rotation;
        self
    }

    /// The local values as a pose
    pub fn local_pose(&self) -> DPose {
        DPose::new(self.local_position, self.local_rotation)
    }

    /// Turn about an axis given in this transform's own frame.
    ///
    /// The axis is carried into the parent frame by the current local
    /// rotation, then the turn is pre-multiplied and renormalized. Used by
    /// yaw/pitch/roll drivers: `rotate_about_local_axis(DVec3::UP, yaw)`.
    pub fn rotate_about_local_axis(&mut self, axis: DVec3, degrees: f64) {
        let axis = (self.local_rotation * axis).normalized();
        let turn = DQuat::from_axis_angle(axis, degrees).normalized();
        self.local_rotation = (turn * self.local_rotation).normalized();
    }
}

impl World {
    /// Transform of an entity
    pub fn transform(&self, entity: Entity) -> Result<&DoubleTransform, WorldError> {
        self.require::<DoubleTransform>(entity)
    }

    /// Mutable transform of an entity
    pub fn transform_mut(&mut self, entity: Entity) -> Result<&mut DoubleTransform, WorldError> {
        self.require_mut::<DoubleTransform>(entity)
    }

    /// Whether the immediate parent carries a transform.
    ///
    /// A parent without one is treated as the universal root.
    pub fn has_parent_transform(&self, entity: Entity) -> bool {
        self.parent(entity)
            .is_some_and(|parent| self.has_component::<DoubleTransform>(parent))
    }

    /// World pose of the parent transform, identity at the root
    pub fn parent_world_pose(&self, entity: Entity) -> Result<DPose, WorldError> {
        match self.parent(entity) {
            Some(parent) if self.has_component::<DoubleTransform>(parent) => self.world_pose(parent),
            _ => Ok(DPose::IDENTITY),
        }
    }

    /// World pose, composed from the root down on every call
    pub fn world_pose(&self, entity: Entity) -> Result<DPose, WorldError> {
        let mut chain = vec![self.transform(entity)?.local_pose()];
        let mut node = entity;
        while let Some(parent) = self.parent(node) {
            let Some(transform) = self.get_component::<DoubleTransform>(parent) else {
                break;
            };
            if chain.len() >= MAX_HIERARCHY_DEPTH {
                return Err(WorldError::HierarchyTooDeep {
                    entity,
                    limit: MAX_HIERARCHY_DEPTH,
                });
            }
            chain.push(transform.local_pose());
            node = parent;
        }

        Ok(chain
            .iter()
            .rev()
            .fold(DPose::IDENTITY, |pose, local| pose.combine(local)))
    }

    /// World position
    pub fn world_position(&self, entity: Entity) -> Result<DVec3, WorldError> {
        Ok(self.world_pose(entity)?.position)
    }

    /// World rotation
    pub fn world_rotation(&self, entity: Entity) -> Result<DQuat, WorldError> {
        Ok(self.world_pose(entity)?.rotation)
    }

    /// Move an entity to a world position by solving for its local position
    pub fn set_world_position(&mut self, entity: Entity, position: DVec3) -> Result<(), WorldError> {
        let parent = self.parent_world_pose(entity)?;
        let local = parent.rotation.conjugate() * (position - parent.position);
        self.transform_mut(entity)?.local_position = local;
        Ok(())
    }

    /// Orient an entity in world space by solving for its local rotation.
    ///
    /// `local = conj(parent_rotation) * rotation`, the exact inverse of the
    /// composition used by [`World::world_rotation`].
    pub fn set_world_rotation(&mut self, entity: Entity, rotation: DQuat) -> Result<(), WorldError> {
        let parent = self.parent_world_pose(entity)?;
        let local = parent.rotation.conjugate() * rotation;
        self.transform_mut(entity)?.local_rotation = local;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f64 = 1e-9;

    fn chain(world: &mut World, depth: usize) -> Entity {
        let mut node = world.create_entity("root");
        world
            .add_component(
                node,
                DoubleTransform::new(
                    DVec3::new(1.0e6, -2.0, 3.5),
                    DQuat::from_axis_angle(DVec3::new(0.3, 1.0, -0.2).normalized(), 35.0),
                ),
            )
            .unwrap();
        for level in 0..depth {
            let child = world.create_child(format!("child{level}"), node).unwrap();
            #[allow(clippy::cast_precision_loss)]
            let angle = 17.0 * (level + 1) as f64;
            world
                .add_component(
                    child,
                    DoubleTransform::new(
                        DVec3::new(10.0, 0.5, -4.0),
                        DQuat::from_axis_angle(DVec3::new(1.0, -0.5, 0.25).normalized(), angle),
                    ),
                )
                .unwrap();
            node = child;
        }
        node
    }

    #[test]
    fn test_root_world_equals_local() {
        let mut world = World::new();
        let e = world.create_entity("e");
        let transform = DoubleTransform::from_position(DVec3::new(1.0, 2.0, 3.0));
        world.add_component(e, transform).unwrap();

        assert_eq!(world.world_position(e).unwrap(), DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(world.world_rotation(e).unwrap(), DQuat::IDENTITY);
        assert!(!world.has_parent_transform(e));
    }

    #[test]
    fn test_child_composes_parent() {
        let mut world = World::new();
        let parent = world.create_entity("parent");
        world
            .add_component(
                parent,
                DoubleTransform::new(DVec3::new(1.0, 0.0, 0.0), DQuat::from_axis_angle(DVec3::UP, 90.0)),
            )
            .unwrap();
        let child = world.create_child("child", parent).unwrap();
        world
            .add_component(child, DoubleTransform::from_position(DVec3::FORWARD))
            .unwrap();

        assert!(world.has_parent_transform(child));
        assert_relative_eq!(world.world_position(child).unwrap(), DVec3::new(2.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_world_setters_round_trip() {
        for depth in 0..5 {
            let mut world = World::new();
            let leaf = chain(&mut world, depth);

            let position = DVec3::new(-3.0e5, 42.0, 7.25);
            world.set_world_position(leaf, position).unwrap();
            assert_relative_eq!(world.world_position(leaf).unwrap(), position, epsilon = 1e-6);

            let rotation = DQuat::from_axis_angle(DVec3::new(0.0, 0.6, 0.8), 123.0);
            world.set_world_rotation(leaf, rotation).unwrap();
            assert_relative_eq!(world.world_rotation(leaf).unwrap(), rotation, epsilon = EPSILON);
        }
    }

    #[test]
    fn test_children_follow_parent() {
        let mut world = World::new();
        let leaf = chain(&mut world, 2);
        let root = world.roots()[0];
        let before = world.world_position(leaf).unwrap();
        let child_local = world.transform(leaf).unwrap().local_position;

        world.set_world_position(root, DVec3::ZERO).unwrap();
        let after = world.world_position(leaf).unwrap();

        assert_eq!(world.transform(leaf).unwrap().local_position, child_local);
        assert!(before.distance(after) > 1.0);
    }

    #[test]
    fn test_parent_without_transform_is_root() {
        let mut world = World::new();
        let group = world.create_entity("group");
        let child = world.create_child("child", group).unwrap();
        world
            .add_component(child, DoubleTransform::from_position(DVec3::new(5.0, 0.0, 0.0)))
            .unwrap();

        assert!(!world.has_parent_transform(child));
        assert_eq!(world.parent_world_pose(child).unwrap(), DPose::IDENTITY);
        assert_eq!(world.world_position(child).unwrap(), DVec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_missing_transform_is_an_error() {
        let mut world = World::new();
        let e = world.create_entity("bare");

        assert_eq!(
            world.world_position(e),
            Err(WorldError::MissingComponent {
                entity: e,
                component: "DoubleTransform"
            })
        );
    }

    #[test]
    fn test_overlong_chain_fails_fast() {
        let mut world = World::new();
        let mut node = world.create_entity("n0");
        world.add_component(node, DoubleTransform::default()).unwrap();
        for i in 0..MAX_HIERARCHY_DEPTH {
            let child = world.create_child(format!("n{}", i + 1), node).unwrap();
            world.add_component(child, DoubleTransform::default()).unwrap();
            node = child;
        }

        assert!(matches!(
            world.world_pose(node),
            Err(WorldError::HierarchyTooDeep { .. })
        ));
    }

    #[test]
    fn test_rotate_about_local_axis() {
        let mut transform = DoubleTransform::default();
        transform.rotate_about_local_axis(DVec3::UP, 90.0);
        assert_relative_eq!(transform.local_rotation.forward(), DVec3::RIGHT, epsilon = EPSILON);

        // Pitch about the already-yawed right axis.
        transform.rotate_about_local_axis(DVec3::RIGHT, 90.0);
        assert_relative_eq!(transform.local_rotation.magnitude(), 1.0, epsilon = EPSILON);
        assert_relative_eq!(transform.local_rotation.forward(), DVec3::DOWN, epsilon = EPSILON);
    }
}

//! ECS World implementation
//!
//! The world is the explicit table standing in for a host scene graph: it
//! owns entity names, active flags, parent/child links and one typed table
//! per capability (transform, physics body, spatial object).

use slotmap::{SecondaryMap, SlotMap};
use thiserror::Error;

use super::{Component, Entity};
use crate::ecs::components::{DoubleTransform, SpatialObject};
use crate::physics::PhysicsBody;

/// Upper bound on parent-chain length walked by any hierarchy query.
///
/// [`World::set_parent`] already refuses links that would close a cycle;
/// the bound turns any chain longer than this into an error instead of an
/// unbounded walk.
pub const MAX_HIERARCHY_DEPTH: usize = 4096;

/// Errors raised by world and hierarchy operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// The entity handle is stale or was never issued by this world
    #[error("Unknown entity: {0:?}")]
    UnknownEntity(Entity),

    /// The entity exists but lacks a required capability
    #[error("Entity {entity:?} has no {component} component")]
    MissingComponent {
        /// Entity that was queried
        entity: Entity,
        /// Name of the missing component type
        component: &'static str,
    },

    /// Linking `child` under `parent` would make the parent chain cyclic
    #[error("Parenting {child:?} under {parent:?} would create a cycle")]
    HierarchyCycle {
        /// Entity being re-parented
        child: Entity,
        /// Requested parent
        parent: Entity,
    },

    /// A parent chain exceeded [`MAX_HIERARCHY_DEPTH`]
    #[error("Parent chain of {entity:?} exceeds {limit} levels")]
    HierarchyTooDeep {
        /// Entity whose chain was being walked
        entity: Entity,
        /// The depth limit
        limit: usize,
    },
}

/// Per-entity bookkeeping: identity, activity and hierarchy links
#[derive(Debug, Clone)]
struct EntityRecord {
    name: String,
    active: bool,
    parent: Option<Entity>,
    children: Vec<Entity>,
}

/// ECS World containing all entities and components
#[derive(Default)]
pub struct World {
    entities: SlotMap<Entity, EntityRecord>,
    roots: Vec<Entity>,
    pub(crate) transforms: SecondaryMap<Entity, DoubleTransform>,
    pub(crate) bodies: SecondaryMap<Entity, PhysicsBody>,
    pub(crate) spatial_objects: SecondaryMap<Entity, SpatialObject>,
}

impl World {
    /// Create a new world
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new active root entity
    pub fn create_entity(&mut self, name: impl Into<String>) -> Entity {
        let entity = self.entities.insert(EntityRecord {
            name: name.into(),
            active: true,
            parent: None,
            children: Vec::new(),
        });
        self.roots.push(entity);
        entity
    }

    /// Create a new active entity as the last child of `parent`
    pub fn create_child(&mut self, name: impl Into<String>, parent: Entity) -> Result<Entity, WorldError> {
        self.record(parent)?;
        let entity = self.create_entity(name);
        self.set_parent(entity, Some(parent))?;
        Ok(entity)
    }

    /// Remove an entity and its whole subtree.
    ///
    /// Returns the spatial objects that were attached to the removed
    /// entities so the caller can release their proxies.
    pub fn despawn(&mut self, entity: Entity) -> Result<Vec<SpatialObject>, WorldError> {
        let subtree = self.subtree(entity)?;
        self.detach(entity)?;

        let mut released = Vec::new();
        for removed in subtree {
            self.entities.remove(removed);
            self.transforms.remove(removed);
            self.bodies.remove(removed);
            if let Some(object) = self.spatial_objects.remove(removed) {
                released.push(object);
            }
        }

        log::debug!("Despawned {:?} ({} spatial objects released)", entity, released.len());
        Ok(released)
    }

    /// Whether the handle refers to a live entity
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains_key(entity)
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the world holds no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Get an iterator over all entities, in no particular order
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.keys()
    }

    /// Top-level entities in creation order
    pub fn roots(&self) -> &[Entity] {
        &self.roots
    }

    /// Entity name
    pub fn name(&self, entity: Entity) -> Result<&str, WorldError> {
        Ok(&self.record(entity)?.name)
    }

    /// First entity with the given name
    pub fn find_by_name(&self, name: &str) -> Option<Entity> {
        self.entities
            .iter()
            .find(|(_, record)| record.name == name)
            .map(|(entity, _)| entity)
    }

    /// The entity's own active flag
    pub fn is_active(&self, entity: Entity) -> Result<bool, WorldError> {
        Ok(self.record(entity)?.active)
    }

    /// Set the entity's own active flag
    pub fn set_active(&mut self, entity: Entity, active: bool) -> Result<(), WorldError> {
        self.record_mut(entity)?.active = active;
        Ok(())
    }

    /// Active itself and through every ancestor
    pub fn is_active_in_hierarchy(&self, entity: Entity) -> Result<bool, WorldError> {
        let mut current = Some(entity);
        let mut depth = 0;
        while let Some(node) = current {
            let record = self.record(node)?;
            if !record.active {
                return Ok(false);
            }
            depth += 1;
            if depth > MAX_HIERARCHY_DEPTH {
                return Err(WorldError::HierarchyTooDeep { entity, limit: MAX_HIERARCHY_DEPTH });
            }
            current = record.parent;
        }
        Ok(true)
    }

    /// Parent entity, if any
    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.entities.get(entity).and_then(|record| record.parent)
    }

    /// Children in insertion order
    pub fn children(&self, entity: Entity) -> &[Entity] {
        self.entities
            .get(entity)
            .map(|record| record.children.as_slice())
            .unwrap_or(&[])
    }

    /// Re-parent `child` under `parent` (`None` makes it a root).
    ///
    /// Only local values are kept, so the child's world pose follows the
    /// new parent. Links that would make the chain cyclic are rejected.
    pub fn set_parent(&mut self, child: Entity, parent: Option<Entity>) -> Result<(), WorldError> {
        self.record(child)?;
        if let Some(parent) = parent {
            self.record(parent)?;
            if self.is_ancestor_or_self(child, parent)? {
                return Err(WorldError::HierarchyCycle { child, parent });
            }
        }

        self.detach(child)?;
        self.record_mut(child)?.parent = parent;
        match parent {
            Some(parent) => self.record_mut(parent)?.children.push(child),
            None => self.roots.push(child),
        }
        Ok(())
    }

    /// Attach a component, replacing any previous one of the same type
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> Result<(), WorldError> {
        self.record(entity)?;
        T::storage_mut(self).insert(entity, component);
        Ok(())
    }

    /// Detach and return a component
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Option<T> {
        T::storage_mut(self).remove(entity)
    }

    /// Get a component from an entity
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        T::storage(self).get(entity)
    }

    /// Get a mutable component from an entity
    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        T::storage_mut(self).get_mut(entity)
    }

    /// Whether the entity carries a component of type `T`
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        T::storage(self).contains_key(entity)
    }

    /// Get a component or fail with [`WorldError::MissingComponent`]
    pub fn require<T: Component>(&self, entity: Entity) -> Result<&T, WorldError> {
        self.record(entity)?;
        self.get_component(entity).ok_or(WorldError::MissingComponent {
            entity,
            component: T::NAME,
        })
    }

    /// Mutable variant of [`World::require`]
    pub fn require_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, WorldError> {
        self.record(entity)?;
        T::storage_mut(self)
            .get_mut(entity)
            .ok_or(WorldError::MissingComponent {
                entity,
                component: T::NAME,
            })
    }

    /// Entity and every descendant, depth-first pre-order
    fn subtree(&self, entity: Entity) -> Result<Vec<Entity>, WorldError> {
        self.record(entity)?;
        let mut order = Vec::new();
        let mut stack = vec![entity];
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        Ok(order)
    }

    /// Whether `candidate` is `entity` or one of the ancestors of `entity`
    fn is_ancestor_or_self(&self, candidate: Entity, entity: Entity) -> Result<bool, WorldError> {
        let mut current = Some(entity);
        let mut depth = 0;
        while let Some(node) = current {
            if node == candidate {
                return Ok(true);
            }
            depth += 1;
            if depth > MAX_HIERARCHY_DEPTH {
                return Err(WorldError::HierarchyTooDeep { entity, limit: MAX_HIERARCHY_DEPTH });
            }
            current = self.parent(node);
        }
        Ok(false)
    }

    /// Unlink an entity from its parent (or the root list)
    fn detach(&mut self, entity: Entity) -> Result<(), WorldError> {
        let parent = self.record(entity)?.parent;
        match parent {
            Some(parent) => {
                if let Some(record) = self.entities.get_mut(parent) {
                    record.children.retain(|&c| c != entity);
                }
            }
            None => self.roots.retain(|&r| r != entity),
        }
        self.record_mut(entity)?.parent = None;
        Ok(())
    }

    fn record(&self, entity: Entity) -> Result<&EntityRecord, WorldError> {
        self.entities.get(entity).ok_or(WorldError::UnknownEntity(entity))
    }

    fn record_mut(&mut self, entity: Entity) -> Result<&mut EntityRecord, WorldError> {
        self.entities.get_mut(entity).ok_or(WorldError::UnknownEntity(entity))
    }
}

//! Spatial object component
//!
//! Marks an entity as something that is drawn at every scale level it is
//! visible in. The component holds the object's true radius and the proxy
//! bookkeeping; placement itself is done by the proxy selector.

use crate::ecs::{Entity, World, WorldError};
use crate::foundation::collections::PrefabHandle;
use crate::scene::proxy::ProxySet;

/// Double-precision renderable object with one proxy slot per scale level
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialObject {
    /// True radius in world units
    pub radius: f64,

    /// Radius of the prefab mesh at unit scale
    pub prefab_radius: f64,

    /// Template proxies are created from. `None` never spawns proxies.
    pub prefab: Option<PrefabHandle>,

    /// Hidden objects are clipped at every level
    pub hidden: bool,

    /// Live proxy per level
    pub proxies: ProxySet,
}

impl SpatialObject {
    /// Create a visible object with no prefab
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            prefab_radius: 1.0,
            prefab: None,
            hidden: false,
            proxies: ProxySet::default(),
        }
    }

    /// Builder pattern: Set the prefab and its reference radius
    pub fn with_prefab(mut self, prefab: PrefabHandle, prefab_radius: f64) -> Self {
        self.prefab = Some(prefab);
        self.prefab_radius = prefab_radius;
        self
    }

    /// Builder pattern: Set hidden flag
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Set hidden flag
    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }
}

impl World {
    /// Spatial object of an entity
    pub fn spatial_object(&self, entity: Entity) -> Result<&SpatialObject, WorldError> {
        self.require::<SpatialObject>(entity)
    }

    /// Mutable spatial object of an entity
    pub fn spatial_object_mut(&mut self, entity: Entity) -> Result<&mut SpatialObject, WorldError> {
        self.require_mut::<SpatialObject>(entity)
    }
}

//! Visual proxies
//!
//! A proxy is the scaled stand-in for a spatial object at one scale level.
//! Proxy lifetime and placement go through the [`ProxyBackend`] trait so the
//! selector never depends on a particular renderer. [`ProxyRegistry`] is the
//! in-memory backend used for headless runs and tests.

use thiserror::Error;

use super::instance::ProxyInstance;
use crate::foundation::collections::{PrefabHandle, ProxyHandle, SlotMap};
use crate::foundation::math::{DQuat, DVec3};

/// Proxy backend errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
    /// The prefab handle is not registered with the backend
    #[error("Unknown prefab: {0:?}")]
    UnknownPrefab(PrefabHandle),

    /// No prefab with this name is available
    #[error("Unknown prefab name: {0}")]
    UnknownPrefabName(String),

    /// The proxy handle is stale or was never issued
    #[error("Unknown proxy: {0:?}")]
    UnknownProxy(ProxyHandle),
}

/// Result type for backend operations
pub type ProxyResult<T> = Result<T, ProxyError>;

/// Placement of one proxy inside its level's local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProxyPlacement {
    /// Scale level the proxy belongs to
    pub level: usize,
    /// Uniform scale applied to the prefab
    pub uniform_scale: f64,
    /// Position relative to the origin, divided by the level scale
    pub local_position: DVec3,
    /// Normalized world rotation of the object
    pub local_rotation: DQuat,
}

impl ProxyPlacement {
    /// Single-precision upload record
    pub fn to_instance(&self) -> ProxyInstance {
        ProxyInstance::from(self)
    }
}

/// Create, place and destroy visual proxies
pub trait ProxyBackend {
    /// Handle of the prefab called `name`
    fn resolve_prefab(&mut self, name: &str) -> ProxyResult<PrefabHandle>;

    /// Instantiate `prefab` on the given level
    fn create_proxy(&mut self, prefab: PrefabHandle, level: usize) -> ProxyResult<ProxyHandle>;

    /// Release a proxy
    fn destroy_proxy(&mut self, proxy: ProxyHandle) -> ProxyResult<()>;

    /// Place a proxy within its level
    fn set_proxy_local_transform(&mut self, proxy: ProxyHandle, placement: &ProxyPlacement) -> ProxyResult<()>;
}

/// One optional proxy per scale level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxySet {
    slots: Vec<Option<ProxyHandle>>,
}

impl ProxySet {
    /// Number of level slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the set has no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Proxy on a level
    pub fn get(&self, level: usize) -> Option<ProxyHandle> {
        self.slots.get(level).copied().flatten()
    }

    /// Store a proxy on a level. Out-of-range levels are ignored.
    pub fn set(&mut self, level: usize, proxy: ProxyHandle) {
        if let Some(slot) = self.slots.get_mut(level) {
            *slot = Some(proxy);
        }
    }

    /// Remove and return the proxy on a level
    pub fn take(&mut self, level: usize) -> Option<ProxyHandle> {
        self.slots.get_mut(level).and_then(Option::take)
    }

    /// Live proxies in level order
    pub fn live(&self) -> impl Iterator<Item = ProxyHandle> + '_ {
        self.slots.iter().flatten().copied()
    }

    /// Number of live proxies
    pub fn live_count(&self) -> usize {
        self.live().count()
    }

    /// Resize to `levels` empty slots.
    ///
    /// Handles still in the set are forgotten; destroy them first.
    pub fn reset(&mut self, levels: usize) {
        self.slots.clear();
        self.slots.resize(levels, None);
    }
}

/// Prefab registered with a [`ProxyRegistry`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefab {
    /// Display name
    pub name: String,
}

/// Proxy held by a [`ProxyRegistry`]
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyRecord {
    /// Prefab the proxy was created from
    pub prefab: PrefabHandle,
    /// Scale level
    pub level: usize,
    /// Last placement, `None` until placed
    pub placement: Option<ProxyPlacement>,
}

/// In-memory proxy backend
#[derive(Debug, Default)]
pub struct ProxyRegistry {
    prefabs: SlotMap<PrefabHandle, Prefab>,
    proxies: SlotMap<ProxyHandle, ProxyRecord>,
    created: u64,
    destroyed: u64,
}

impl ProxyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prefab proxies can be created from
    pub fn register_prefab(&mut self, name: impl Into<String>) -> PrefabHandle {
        let name = name.into();
        log::debug!("Registered prefab '{}'", name);
        self.prefabs.insert(Prefab { name })
    }

    /// Look up a prefab by name
    pub fn find_prefab(&self, name: &str) -> Option<PrefabHandle> {
        self.prefabs
            .iter()
            .find(|(_, prefab)| prefab.name == name)
            .map(|(handle, _)| handle)
    }

    /// Registered prefab
    pub fn prefab(&self, handle: PrefabHandle) -> Option<&Prefab> {
        self.prefabs.get(handle)
    }

    /// Live proxy
    pub fn proxy(&self, handle: ProxyHandle) -> Option<&ProxyRecord> {
        self.proxies.get(handle)
    }

    /// Number of live proxies
    pub fn live_count(&self) -> usize {
        self.proxies.len()
    }

    /// Proxies created since construction
    pub fn created_total(&self) -> u64 {
        self.created
    }

    /// Proxies destroyed since construction
    pub fn destroyed_total(&self) -> u64 {
        self.destroyed
    }

    /// Live proxies on a level
    pub fn proxies_on_level(&self, level: usize) -> impl Iterator<Item = (ProxyHandle, &ProxyRecord)> + '_ {
        self.proxies.iter().filter(move |(_, record)| record.level == level)
    }

    /// Upload records for every placed proxy on a level
    pub fn instances(&self, level: usize) -> Vec<ProxyInstance> {
        self.proxies_on_level(level)
            .filter_map(|(_, record)| record.placement.as_ref().map(ProxyInstance::from))
            .collect()
    }

    /// [`ProxyRegistry::instances`] as raw bytes
    pub fn instance_bytes(&self, level: usize) -> Vec<u8> {
        bytemuck::cast_slice(&self.instances(level)).to_vec()
    }
}

impl ProxyBackend for ProxyRegistry {
    /// Registers the name on first use.
    fn resolve_prefab(&mut self, name: &str) -> ProxyResult<PrefabHandle> {
        Ok(self.find_prefab(name).unwrap_or_else(|| self.register_prefab(name)))
    }

    fn create_proxy(&mut self, prefab: PrefabHandle, level: usize) -> ProxyResult<ProxyHandle> {
        if !self.prefabs.contains_key(prefab) {
            return Err(ProxyError::UnknownPrefab(prefab));
        }
        self.created += 1;
        Ok(self.proxies.insert(ProxyRecord {
            prefab,
            level,
            placement: None,
        }))
    }

    fn destroy_proxy(&mut self, proxy: ProxyHandle) -> ProxyResult<()> {
        self.proxies.remove(proxy).ok_or(ProxyError::UnknownProxy(proxy))?;
        self.destroyed += 1;
        Ok(())
    }

    fn set_proxy_local_transform(&mut self, proxy: ProxyHandle, placement: &ProxyPlacement) -> ProxyResult<()> {
        let record = self.proxies.get_mut(proxy).ok_or(ProxyError::UnknownProxy(proxy))?;
        record.placement = Some(*placement);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_set_reset() {
        let mut registry = ProxyRegistry::new();
        let prefab = registry.register_prefab("sphere");
        let proxy = registry.create_proxy(prefab, 1).unwrap();

        let mut set = ProxySet::default();
        set.reset(3);
        set.set(1, proxy);
        set.set(7, proxy);

        assert_eq!(set.len(), 3);
        assert_eq!(set.get(1), Some(proxy));
        assert_eq!(set.live().collect::<Vec<_>>(), vec![proxy]);
        assert_eq!(set.take(1), Some(proxy));
        assert_eq!(set.take(1), None);
        set.reset(2);
        assert_eq!(set.len(), 2);
        assert_eq!(set.live_count(), 0);
    }

    #[test]
    fn test_registry_lifecycle() {
        let mut registry = ProxyRegistry::new();
        let prefab = registry.register_prefab("sphere");
        assert_eq!(registry.find_prefab("sphere"), Some(prefab));
        assert_eq!(registry.resolve_prefab("sphere"), Ok(prefab));
        assert_ne!(registry.resolve_prefab("rock"), Ok(prefab));

        let proxy = registry.create_proxy(prefab, 0).unwrap();
        let placement = ProxyPlacement {
            level: 0,
            uniform_scale: 2.0,
            local_position: DVec3::new(1.0, 0.0, 0.0),
            local_rotation: DQuat::IDENTITY,
        };
        registry.set_proxy_local_transform(proxy, &placement).unwrap();

        assert_eq!(registry.instances(0).len(), 1);
        assert_eq!(registry.instance_bytes(0).len(), 32);
        assert!(registry.instances(1).is_empty());

        registry.destroy_proxy(proxy).unwrap();
        assert_eq!(registry.destroy_proxy(proxy), Err(ProxyError::UnknownProxy(proxy)));
        assert_eq!(
            registry.set_proxy_local_transform(proxy, &placement),
            Err(ProxyError::UnknownProxy(proxy))
        );
        assert_eq!((registry.created_total(), registry.destroyed_total()), (1, 1));
    }

    #[test]
    fn test_unknown_prefab() {
        let mut registry = ProxyRegistry::new();
        registry.register_prefab("sphere");

        let mut other = ProxyRegistry::new();
        other.register_prefab("rock");
        let foreign = other.register_prefab("ice");

        assert_eq!(registry.create_proxy(foreign, 0), Err(ProxyError::UnknownPrefab(foreign)));
        assert_eq!(registry.live_count(), 0);
    }
}

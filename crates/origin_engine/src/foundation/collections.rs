//! Generational handle types
//!
//! Handles are slot-map keys: a stale handle (its slot freed and reused)
//! never aliases the new occupant.

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Handle of a visual proxy owned by a [`ProxyBackend`](crate::scene::ProxyBackend)
    pub struct ProxyHandle;

    /// Handle of a proxy prefab (the template proxies are instantiated from)
    pub struct PrefabHandle;
}

//! Entity implementation

slotmap::new_key_type! {
    /// Entity identifier.
    ///
    /// A generational index into the [`World`](super::World) capability
    /// table. Handles of despawned entities stay invalid even after their
    /// slot is reused.
    pub struct Entity;
}

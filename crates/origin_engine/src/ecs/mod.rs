//! Entity-Component-System implementation
//!
//! A small explicit capability table: entities are generational handles,
//! the hierarchy is stored as parent/child links, and each component type
//! has its own keyed table.

pub mod component;
pub mod components;
pub mod entity;
pub mod query;
pub mod world;

pub use component::Component;
pub use entity::Entity;
pub use world::{World, WorldError, MAX_HIERARCHY_DEPTH};

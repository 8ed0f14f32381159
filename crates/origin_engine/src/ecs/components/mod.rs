//! ECS Components module
//!
//! Capability records attachable to entities. The physics body lives in
//! [`crate::physics`] next to the integrator that consumes it.

pub mod spatial;
pub mod transform;

pub use spatial::SpatialObject;
pub use transform::DoubleTransform;

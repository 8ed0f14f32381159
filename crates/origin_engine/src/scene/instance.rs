//! Single-precision proxy placement in upload layout
// The bytemuck derives expand to `unsafe impl`s checked at compile time.
#![allow(unsafe_code)]

use bytemuck::{Pod, Zeroable};

use super::proxy::ProxyPlacement;

/// Per-proxy instance record, tightly packed for a vertex/instance buffer
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ProxyInstance {
    /// Level-local position
    pub position: [f32; 3],
    /// Uniform scale
    pub scale: f32,
    /// Unit rotation as `[x, y, z, w]`
    pub rotation: [f32; 4],
}

impl From<&ProxyPlacement> for ProxyInstance {
    #[allow(clippy::cast_possible_truncation)]
    fn from(placement: &ProxyPlacement) -> Self {
        let rotation = placement.local_rotation.to_quat();
        Self {
            position: placement.local_position.to_vec3().into(),
            scale: placement.uniform_scale as f32,
            rotation: [rotation.i, rotation.j, rotation.k, rotation.w],
        }
    }
}

//! Math utilities and types
//!
//! Double-precision types (`DVec3`, `DQuat`, `DPose`) carry simulation state.
//! The single-precision nalgebra aliases are the render-side types proxies
//! are handed in once they have been scaled into a level's local space.

mod quaternion;
mod vector;

pub use quaternion::DQuat;
pub use vector::DVec3;

pub use nalgebra::{Quaternion, Unit, UnitQuaternion, Vector3};

/// Single-precision render vector
pub type Vec3 = Vector3<f32>;

/// Single-precision render rotation
pub type Quat = UnitQuaternion<f32>;

/// Rigid pose (position and rotation, no scale) in double precision
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DPose {
    /// Position
    pub position: DVec3,

    /// Rotation quaternion
    pub rotation: DQuat,
}

impl DPose {
    /// The identity pose, used for the universal root
    pub const IDENTITY: Self = Self {
        position: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
    };

    /// Create a pose from position and rotation
    pub const fn new(position: DVec3, rotation: DQuat) -> Self {
        Self { position, rotation }
    }

    /// Express a child-local pose in this pose's parent space.
    ///
    /// `rotation = self.rotation * local.rotation`,
    /// `position = self.rotation * local.position + self.position`.
    pub fn combine(&self, local: &Self) -> Self {
        Self {
            position: self.rotation * local.position + self.position,
            rotation: self.rotation * local.rotation,
        }
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f64 = std::f64::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f64 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f64) -> f64 {
        degrees * constants::DEG_TO_RAD
    }

    /// Linear interpolation
    pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a + (b - a) * t
    }
}

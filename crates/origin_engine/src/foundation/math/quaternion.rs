//! Double-precision quaternion
//!
//! Stored as `(x, y, z, w)` with `w` the scalar part. Rotations compose with
//! the Hamilton product, left operand first: `parent * local` applies `local`
//! inside the frame of `parent`.
//!
//! Quaternions are not forced to unit length. Composition, rotation of
//! vectors and the conjugate-as-inverse identity only have geometric meaning
//! for (near) unit inputs; callers that accumulate many products should
//! renormalize.

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

use super::{utils, DVec3, Quat};

/// Double-precision quaternion `(x, y, z, w)`.
///
/// Equality is exact component-wise `f64` equality, without any epsilon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DQuat {
    /// Vector part, X
    pub x: f64,
    /// Vector part, Y
    pub y: f64,
    /// Vector part, Z
    pub z: f64,
    /// Scalar part
    pub w: f64,
}

impl Default for DQuat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl DQuat {
    /// The identity rotation
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Create a quaternion from raw components
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `radians` about `axis`. The axis is normalized first; a
    /// zero axis yields a pure scalar quaternion.
    pub fn from_axis_angle_rad(axis: DVec3, radians: f64) -> Self {
        let axis = axis.normalized();
        let (sin, cos) = (radians * 0.5).sin_cos();
        Self::new(axis.x * sin, axis.y * sin, axis.z * sin, cos)
    }

    /// Rotation of `degrees` about `axis`
    pub fn from_axis_angle(axis: DVec3, degrees: f64) -> Self {
        Self::from_axis_angle_rad(axis, utils::deg_to_rad(degrees))
    }

    /// Four-component dot product
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Squared norm
    pub fn magnitude_squared(self) -> f64 {
        self.dot(self)
    }

    /// Norm
    pub fn magnitude(self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    /// Unit quaternion in the same direction.
    ///
    /// Unlike [`DVec3::normalized`] there is no zero guard: the zero
    /// quaternion produces NaN components.
    pub fn normalized(self) -> Self {
        self / self.magnitude()
    }

    /// Conjugate `(-x, -y, -z, w)`; the inverse rotation for unit inputs
    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Rotate a vector: `q * (v, 0) * conj(q)` with the scalar part dropped
    pub fn rotate(self, v: DVec3) -> DVec3 {
        let pure = Self::new(v.x, v.y, v.z, 0.0);
        let r = self * pure * self.conjugate();
        DVec3::new(r.x, r.y, r.z)
    }

    /// Local +X axis in the rotated frame
    pub fn right(self) -> DVec3 {
        self.rotate(DVec3::RIGHT)
    }

    /// Local -X axis in the rotated frame
    pub fn left(self) -> DVec3 {
        self.rotate(DVec3::LEFT)
    }

    /// Local +Y axis in the rotated frame
    pub fn up(self) -> DVec3 {
        self.rotate(DVec3::UP)
    }

    /// Local -Y axis in the rotated frame
    pub fn down(self) -> DVec3 {
        self.rotate(DVec3::DOWN)
    }

    /// Local +Z axis in the rotated frame
    pub fn forward(self) -> DVec3 {
        self.rotate(DVec3::FORWARD)
    }

    /// Local -Z axis in the rotated frame
    pub fn back(self) -> DVec3 {
        self.rotate(DVec3::BACK)
    }

    /// Component-wise linear interpolation followed by normalization.
    ///
    /// Cheap, but the angular velocity is not constant over `t`.
    pub fn lerp(a: Self, b: Self, t: f64) -> Self {
        Self::new(
            utils::lerp(a.x, b.x, t),
            utils::lerp(a.y, b.y, t),
            utils::lerp(a.z, b.z, t),
            utils::lerp(a.w, b.w, t),
        )
        .normalized()
    }

    /// Spherical interpolation `(a sin((1-t)θ) + b sin(tθ)) / sin θ` with
    /// `θ = acos(dot(a, b))`.
    ///
    /// There is no guard for `sin θ ≈ 0`: coincident inputs (`θ = 0`) and
    /// antipodal inputs (`θ = π`) divide by zero and yield NaN or infinite
    /// components. Shortest-arc selection is not performed either.
    pub fn slerp(a: Self, b: Self, t: f64) -> Self {
        let angle = a.dot(b).acos();
        (a * (angle * (1.0 - t)).sin() + b * (angle * t).sin()) / angle.sin()
    }

    /// True when every component is finite
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }

    /// Components as `[x, y, z, w]`
    pub const fn to_array(self) -> [f64; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// Single-precision render rotation, normalized on the way out. Lossy.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_quat(self) -> Quat {
        Quat::new_normalize(nalgebra::Quaternion::new(
            self.w as f32,
            self.x as f32,
            self.y as f32,
            self.z as f32,
        ))
    }
}

impl fmt::Display for DQuat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DQuat({}, {}, {}, {})", self.x, self.y, self.z, self.w)
    }
}

/// Hamilton product, left operand first. Non-commutative.
impl Mul for DQuat {
    type Output = Self;

    fn mul(self, r: Self) -> Self {
        let l = self;
        Self::new(
            l.w * r.x + l.x * r.w + l.y * r.z - l.z * r.y,
            l.w * r.y + l.y * r.w + l.z * r.x - l.x * r.z,
            l.w * r.z + l.z * r.w + l.x * r.y - l.y * r.x,
            l.w * r.w - l.x * r.x - l.y * r.y - l.z * r.z,
        )
    }
}

impl Mul<DVec3> for DQuat {
    type Output = DVec3;

    fn mul(self, v: DVec3) -> DVec3 {
        self.rotate(v)
    }
}

impl Mul<f64> for DQuat {
    type Output = Self;

    fn mul(self, f: f64) -> Self {
        Self::new(self.x * f, self.y * f, self.z * f, self.w * f)
    }
}

impl Div<f64> for DQuat {
    type Output = Self;

    fn div(self, f: f64) -> Self {
        Self::new(self.x / f, self.y / f, self.z / f, self.w / f)
    }
}

// Sums and differences are interpolation intermediates, not rotations.
impl Add for DQuat {
    type Output = Self;

    fn add(self, b: Self) -> Self {
        Self::new(self.x + b.x, self.y + b.y, self.z + b.z, self.w + b.w)
    }
}

impl Sub for DQuat {
    type Output = Self;

    fn sub(self, b: Self) -> Self {
        Self::new(self.x - b.x, self.y - b.y, self.z - b.z, self.w - b.w)
    }
}

impl From<nalgebra::Quaternion<f64>> for DQuat {
    fn from(q: nalgebra::Quaternion<f64>) -> Self {
        Self::new(q.i, q.j, q.k, q.w)
    }
}

impl From<DQuat> for nalgebra::Quaternion<f64> {
    fn from(q: DQuat) -> Self {
        Self::new(q.w, q.x, q.y, q.z)
    }
}

impl approx::AbsDiffEq for DQuat {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon)
            && self.y.abs_diff_eq(&other.y, epsilon)
            && self.z.abs_diff_eq(&other.z, epsilon)
            && self.w.abs_diff_eq(&other.w, epsilon)
    }
}

impl approx::RelativeEq for DQuat {
    fn default_max_relative() -> f64 {
        f64::EPSILON
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.x.relative_eq(&other.x, epsilon, max_relative)
            && self.y.relative_eq(&other.y, epsilon, max_relative)
            && self.z.relative_eq(&other.z, epsilon, max_relative)
            && self.w.relative_eq(&other.w, epsilon, max_relative)
    }
}

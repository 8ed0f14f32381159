//! Double-precision 3D vector
//!
//! `DVec3` carries absolute coordinates that would lose precision in `f32`
//! (positions millions of kilometres from the scene origin). It converts to
//! the single-precision render [`Vec3`](super::Vec3) only once a position has
//! been moved into a level's local space.

use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use super::Vec3;

/// Double-precision 3D vector.
///
/// Equality is exact component-wise `f64` equality, without any epsilon.
/// Values that went through different arithmetic paths will usually not
/// compare equal; use the `approx` traits for tolerance comparisons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DVec3 {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
    /// Z component
    pub z: f64,
}

impl DVec3 {
    /// The zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// Unit vector along +X
    pub const RIGHT: Self = Self::new(1.0, 0.0, 0.0);
    /// Unit vector along -X
    pub const LEFT: Self = Self::new(-1.0, 0.0, 0.0);
    /// Unit vector along +Y
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);
    /// Unit vector along -Y
    pub const DOWN: Self = Self::new(0.0, -1.0, 0.0);
    /// Unit vector along +Z
    pub const FORWARD: Self = Self::new(0.0, 0.0, 1.0);
    /// Unit vector along -Z
    pub const BACK: Self = Self::new(0.0, 0.0, -1.0);

    /// Create a vector from components
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Vector with all three components set to `value`
    pub const fn splat(value: f64) -> Self {
        Self::new(value, value, value)
    }

    /// Dot product
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Squared length
    pub fn magnitude_squared(self) -> f64 {
        self.dot(self)
    }

    /// Length
    pub fn magnitude(self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    /// Unit vector in the same direction.
    ///
    /// The zero vector normalizes to zero; this is a defined result, not an
    /// error. Only an exactly zero length takes that path.
    pub fn normalized(self) -> Self {
        let length = self.magnitude();
        if length == 0.0 {
            return Self::ZERO;
        }
        self / length
    }

    /// Normalize in place
    pub fn normalize(&mut self) {
        *self = self.normalized();
    }

    /// Component-wise product
    pub fn component_mul(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }

    /// Component-wise absolute value
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Distance between two points
    pub fn distance(self, other: Self) -> f64 {
        (other - self).magnitude()
    }

    /// True when every component is finite
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Components as an array
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Single-precision render vector. Lossy.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

impl fmt::Display for DVec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DVec3({}, {}, {})", self.x, self.y, self.z)
    }
}

impl Add for DVec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for DVec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for DVec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for DVec3 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for DVec3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for DVec3 {
    type Output = Self;

    fn mul(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

impl Mul<DVec3> for f64 {
    type Output = DVec3;

    fn mul(self, v: DVec3) -> DVec3 {
        v * self
    }
}

impl MulAssign<f64> for DVec3 {
    fn mul_assign(&mut self, factor: f64) {
        *self = *self * factor;
    }
}

impl Div<f64> for DVec3 {
    type Output = Self;

    fn div(self, divisor: f64) -> Self {
        Self::new(self.x / divisor, self.y / divisor, self.z / divisor)
    }
}

impl DivAssign<f64> for DVec3 {
    fn div_assign(&mut self, divisor: f64) {
        *self = *self / divisor;
    }
}

impl From<[f64; 3]> for DVec3 {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<nalgebra::Vector3<f64>> for DVec3 {
    fn from(v: nalgebra::Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<DVec3> for nalgebra::Vector3<f64> {
    fn from(v: DVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl approx::AbsDiffEq for DVec3 {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon)
            && self.y.abs_diff_eq(&other.y, epsilon)
            && self.z.abs_diff_eq(&other.z, epsilon)
    }
}

impl approx::RelativeEq for DVec3 {
    fn default_max_relative() -> f64 {
        f64::EPSILON
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.x.relative_eq(&other.x, epsilon, max_relative)
            && self.y.relative_eq(&other.y, epsilon, max_relative)
            && self.z.relative_eq(&other.z, epsilon, max_relative)
    }
}

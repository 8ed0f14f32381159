//! Newtonian point-mass gravity

use crate::foundation::math::DVec3;

/// Newton's gravitational constant in m^3 kg^-1 s^-2
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67e-11;

/// Force exerted on the body at `from` by the body at `to`.
///
/// `G m_from m_to / |d|^2` along `normalize(to - from)`. There is no
/// softening: coincident positions yield a non-finite force.
pub fn gravity_force(g: f64, from_mass: f64, from: DVec3, to_mass: f64, to: DVec3) -> DVec3 {
    let delta = to - from;
    let magnitude = g * from_mass * to_mass / delta.magnitude_squared();
    delta.normalized() * magnitude
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_inverse_square() {
        let near = gravity_force(1.0, 2.0, DVec3::ZERO, 3.0, DVec3::new(2.0, 0.0, 0.0));
        let far = gravity_force(1.0, 2.0, DVec3::ZERO, 3.0, DVec3::new(4.0, 0.0, 0.0));

        assert_relative_eq!(near, DVec3::new(1.5, 0.0, 0.0));
        assert_relative_eq!(far.magnitude() * 4.0, near.magnitude());
    }

    #[test]
    fn test_earth_surface_gravity() {
        let earth_mass = 5.972e24;
        let earth_radius = 6.371e6;
        let force = gravity_force(
            GRAVITATIONAL_CONSTANT,
            1.0,
            DVec3::new(0.0, earth_radius, 0.0),
            earth_mass,
            DVec3::ZERO,
        );

        assert_relative_eq!(force.y, -9.81, epsilon = 0.02);
    }

    #[test]
    fn test_coincident_bodies_are_not_finite() {
        let force = gravity_force(GRAVITATIONAL_CONSTANT, 1.0, DVec3::ZERO, 1.0, DVec3::ZERO);
        assert!(!force.is_finite());
    }
}

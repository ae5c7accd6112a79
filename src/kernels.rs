//! Cubic B-spline smoothing kernel for SPH density estimation.
//!
//! Support is [0, 2h] with normalization 1/(pi h^3), the standard two-piece
//! polynomial (Monaghan 1992).

use glam::Vec3;

use crate::constants::MIN_SEPARATION;

/// Kernel weight for a pair separated by distance `r`.
///
/// With z = r/h:
/// W = (1 - 3/2 z^2 + 3/4 z^3) / (pi h^3)   for z in [0, 1]
/// W = 1/4 (2 - z)^3 / (pi h^3)             for z in (1, 2]
/// W = 0                                     beyond
#[inline]
pub fn cubic_spline(r: f32, h: f32) -> f32 {
    let z = r / h;
    let sigma = 1.0 / (std::f32::consts::PI * h * h * h);
    if z <= 1.0 {
        (1.0 - 1.5 * z * z + 0.75 * z * z * z) * sigma
    } else if z <= 2.0 {
        0.25 * (2.0 - z) * (2.0 - z) * (2.0 - z) * sigma
    } else {
        0.0
    }
}

/// Gradient of the kernel with respect to the separation vector `x`.
///
/// By radial symmetry the gradient lies along x; its magnitude is
/// dW/dz * 1/h. Zero-length separations and points beyond the support
/// return zero rather than an undefined direction.
#[inline]
pub fn cubic_spline_gradient(x: Vec3, h: f32) -> Vec3 {
    let r = x.length();
    if r < MIN_SEPARATION {
        return Vec3::ZERO;
    }
    let z = r / h;
    let sigma = 1.0 / (std::f32::consts::PI * h * h * h);
    let dw_dz = if z <= 1.0 {
        (-3.0 * z + 2.25 * z * z) * sigma
    } else if z <= 2.0 {
        -0.75 * (2.0 - z) * (2.0 - z) * sigma
    } else {
        return Vec3::ZERO;
    };
    x / r * (dw_dz / h)
}

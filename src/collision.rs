//! Collision primitives shared by both solvers.
//!
//! The primitive set is closed, so colliders are a tagged variant rather
//! than a trait object. `collide` is a pure correction function: the caller
//! hands in the previous (committed) position and the tentative position for
//! this step, and commits whatever comes back. Calling it again with an
//! already-resolved tentative position returns it unchanged.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::{MIN_SEPARATION, SURFACE_OFFSET};
use crate::serde_utils::{deserialize_vec3, serialize_vec3};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum Collider {
    /// Infinite plane through `point` with unit `normal`.
    Plane {
        #[serde(serialize_with = "serialize_vec3", deserialize_with = "deserialize_vec3")]
        point: Vec3,
        #[serde(serialize_with = "serialize_vec3", deserialize_with = "deserialize_vec3")]
        normal: Vec3,
        friction: f32,
    },
    /// Solid sphere centered at `origin`.
    Sphere {
        #[serde(serialize_with = "serialize_vec3", deserialize_with = "deserialize_vec3")]
        origin: Vec3,
        radius: f32,
        friction: f32,
    },
}

impl Collider {
    pub fn plane(point: Vec3, normal: Vec3, friction: f32) -> Self {
        assert!(
            normal.length_squared() > 0.0,
            "plane normal must be nonzero"
        );
        assert!(
            (0.0..=1.0).contains(&friction),
            "friction must be in [0, 1], got {}",
            friction
        );
        Self::Plane {
            point,
            normal: normal.normalize(),
            friction,
        }
    }

    pub fn sphere(origin: Vec3, radius: f32, friction: f32) -> Self {
        assert!(radius > 0.0, "sphere radius must be positive, got {}", radius);
        assert!(
            (0.0..=1.0).contains(&friction),
            "friction must be in [0, 1], got {}",
            friction
        );
        Self::Sphere { origin, radius, friction }
    }

    /// Resolve `tentative` against this primitive.
    ///
    /// `prev` is the particle's committed position from before the move; it
    /// determines which side of a plane the particle came from and anchors
    /// the friction blend.
    pub fn collide(&self, prev: Vec3, tentative: Vec3) -> Vec3 {
        match *self {
            Self::Plane { point, normal, friction } => {
                let last_side = (prev - point).dot(normal);
                let side = (tentative - point).dot(normal);
                // A particle exactly on the plane has no crossing to resolve.
                if side == 0.0 {
                    return tentative;
                }
                let crossed = (last_side >= 0.0 && side < 0.0)
                    || (last_side <= 0.0 && side > 0.0);
                if !crossed {
                    return tentative;
                }
                // Project onto the plane, nudged back toward the approach side.
                let target = tentative - side * normal - side.signum() * SURFACE_OFFSET * normal;
                prev + (target - prev) * (1.0 - friction)
            }
            Self::Sphere { origin, radius, friction } => {
                let to_particle = tentative - origin;
                let dist = to_particle.length();
                if dist >= radius || dist < MIN_SEPARATION {
                    return tentative;
                }
                let target = origin + to_particle / dist * radius;
                prev + (target - prev) * (1.0 - friction)
            }
        }
    }
}

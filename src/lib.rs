//! Cloth and fluid particle simulation core.
//!
//! Two independent solvers over a shared particle data model:
//!
//! - [`Cloth`]: a mass-spring grid integrated with explicit Verlet, with
//!   hash-grid self-collision and Provot strain limiting
//! - [`Fluid`]: Position Based Fluids (iterative density-constraint
//!   projection) with k-d tree neighbor search, vorticity confinement, and
//!   XSPH viscosity
//!
//! Both solvers resolve collisions against the same [`Collider`] primitives
//! and are driven by a fixed-size step loop: the caller supplies per-step
//! external accelerations and colliders, and each `step` call advances one
//! substep synchronously.
//!
//! This crate is framework-agnostic - it handles simulation only. Renderers
//! read the particle `position` fields directly.
//!
//! # Example
//!
//! ```
//! use softsim::{Cloth, ClothParams, Collider, Orientation, StepTiming, Vec3};
//!
//! // A hanging cloth pinned at its two top corners, falling onto a floor.
//! let pinned = [(0, 7), (7, 7)];
//! let mut cloth = Cloth::new(1.0, 1.0, 8, 8, 0.01, Orientation::Vertical, &pinned, 42);
//!
//! let timing = StepTiming::new(60.0, 4.0);
//! let gravity = [Vec3::new(0.0, -9.8, 0.0)];
//! let floor = [Collider::plane(Vec3::new(0.0, -1.5, 0.0), Vec3::Y, 0.2)];
//!
//! for _ in 0..4 {
//!     cloth.step(timing, &ClothParams::default(), &gravity, &floor);
//! }
//! ```

use serde::{Deserialize, Serialize};

pub mod cloth;
pub mod collision;
pub mod constants;
pub mod fluid;
pub mod kdtree;
pub mod kernels;
pub mod particle;
pub mod serde_utils;
pub mod spatial;
pub mod spring;

pub use cloth::{Cloth, ClothParams, Orientation};
pub use collision::Collider;
pub use fluid::{Fluid, FluidParams};
pub use glam::Vec3;
pub use particle::{FluidParticle, PointMass};
pub use spring::{Spring, SpringKind};

/// Fixed-step timing shared by both solvers.
///
/// One `step` call advances one substep of `1 / frames_per_sec /
/// steps_per_frame` seconds; a frame is `steps_per_frame` consecutive calls.
/// The substep count also scales per-substep self-collision corrections so a
/// frame's total correction is independent of how finely it is subdivided.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct StepTiming {
    pub frames_per_sec: f32,
    pub steps_per_frame: f32,
}

impl StepTiming {
    pub fn new(frames_per_sec: f32, steps_per_frame: f32) -> Self {
        assert!(frames_per_sec > 0.0, "frames_per_sec must be positive");
        assert!(steps_per_frame > 0.0, "steps_per_frame must be positive");
        Self { frames_per_sec, steps_per_frame }
    }

    /// Duration of one substep in seconds.
    #[inline]
    pub fn dt(&self) -> f32 {
        1.0 / self.frames_per_sec / self.steps_per_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substep_duration() {
        let timing = StepTiming::new(60.0, 4.0);
        assert!((timing.dt() - 1.0 / 240.0).abs() < 1e-9);
    }

    #[test]
    #[should_panic(expected = "frames_per_sec must be positive")]
    fn rejects_zero_rate() {
        StepTiming::new(0.0, 4.0);
    }
}

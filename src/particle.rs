//! Particle state for both solvers.
//!
//! The cloth solver integrates [`PointMass`] with Verlet (current + previous
//! position, no explicit velocity). The fluid solver advances
//! [`FluidParticle`] with an explicit velocity and a predicted position that
//! the constraint iterations refine before it is committed.

use glam::Vec3;

/// A point mass in the cloth grid.
#[derive(Clone, Copy, Debug)]
pub struct PointMass {
    /// Position at construction, restored by reset
    pub start_position: Vec3,
    /// Authoritative position
    pub position: Vec3,
    /// Position at the previous step (Verlet state)
    pub last_position: Vec3,
    /// Force accumulator, zeroed at the start of every step
    pub forces: Vec3,
    /// Pinned point masses never move
    pub pinned: bool,
}

impl PointMass {
    pub fn new(position: Vec3, pinned: bool) -> Self {
        Self {
            start_position: position,
            position,
            last_position: position,
            forces: Vec3::ZERO,
            pinned,
        }
    }

    /// Restore the construction-time state, discarding all motion.
    pub fn reset(&mut self) {
        self.position = self.start_position;
        self.last_position = self.start_position;
        self.forces = Vec3::ZERO;
    }
}

/// A fluid particle.
///
/// `position` is authoritative between frames. `next_position` and
/// `delta_pos` are solver scratch: the constraint iterations refine
/// `next_position` and it is committed back to `position` at the end of the
/// step.
#[derive(Clone, Copy, Debug)]
pub struct FluidParticle {
    /// Position at construction, restored by reset
    pub start_position: Vec3,
    /// Authoritative position
    pub position: Vec3,
    /// Predicted position being refined by the constraint solver
    pub next_position: Vec3,
    /// Explicit velocity
    pub velocity: Vec3,
    /// Accumulated force, consumed and cleared by the next predict phase
    pub forces: Vec3,
    /// SPH density estimate from the most recent solver iteration
    pub density_est: f32,
    /// Lagrange multiplier of the density constraint
    pub lambda: f32,
    /// Pending position correction for the current solver iteration
    pub delta_pos: Vec3,
    /// Vorticity from the most recent finalize phase
    pub vorticity: Vec3,
}

impl FluidParticle {
    pub fn new(position: Vec3) -> Self {
        Self {
            start_position: position,
            position,
            next_position: position,
            velocity: Vec3::ZERO,
            forces: Vec3::ZERO,
            density_est: 0.0,
            lambda: 0.0,
            delta_pos: Vec3::ZERO,
            vorticity: Vec3::ZERO,
        }
    }

    /// Restore the construction-time state, discarding all motion and
    /// solver scratch.
    pub fn reset(&mut self) {
        self.position = self.start_position;
        self.next_position = self.start_position;
        self.velocity = Vec3::ZERO;
        self.forces = Vec3::ZERO;
        self.density_est = 0.0;
        self.lambda = 0.0;
        self.delta_pos = Vec3::ZERO;
        self.vorticity = Vec3::ZERO;
    }
}

//! Physical and numerical constants shared by both solvers.

/// Gravity acceleration (m/s^2) - negative Y direction
pub const GRAVITY: f32 = -9.8;

/// Offset applied when a particle is pushed back to a plane surface, so the
/// corrected position does not re-penetrate on the next signed-distance test.
pub const SURFACE_OFFSET: f32 = 1e-4;

/// Bending springs are softer than structural/shearing springs; their
/// Hookean force is scaled by this factor.
pub const BENDING_FORCE_SCALE: f32 = 0.2;

/// Provot strain limit: a spring may not exceed this multiple of its rest
/// length after position correction (10% max strain).
pub const MAX_STRAIN_RATIO: f32 = 1.1;

/// Self-collision hash cells span this many grid spacings per axis, so a
/// cell holds only true near neighbors of a point mass.
pub const HASH_CELL_SPAN: f32 = 3.0;

/// Separations below this are treated as degenerate: no meaningful unit
/// direction exists, so the force/gradient/correction contribution is zero.
pub const MIN_SEPARATION: f32 = 1e-6;

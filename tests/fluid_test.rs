//! Behavioral tests for the PBF fluid solver.
//!
//! Covers the density constraint (a rest-density lattice stays near C = 0),
//! pairwise self-collision, primitive collision against the predicted
//! position, gravity response, and reset semantics.

use softsim::{Collider, Fluid, FluidParams, StepTiming, Vec3};

const GRAVITY: Vec3 = Vec3::new(0.0, -9.8, 0.0);

/// Params with the approximate post-solve terms switched off, so tests see
/// the constraint projection alone.
fn plain_params() -> FluidParams {
    FluidParams {
        vorticity_epsilon: 0.0,
        viscosity: 0.0,
        ..FluidParams::default()
    }
}

// =============================================================================
// DENSITY CONSTRAINT
// =============================================================================

#[test]
fn rest_density_lattice_keeps_constraint_near_zero() {
    // Lattice spacing equal to h with mass rho_0 * spacing^3 samples the
    // rest density: the cubic spline weights over the lattice sum to almost
    // exactly 1 / spacing^3.
    let spacing = 0.1;
    let params = FluidParams {
        rest_density: 1000.0,
        particle_mass: 1000.0 * spacing * spacing * spacing,
        smoothing_radius: spacing,
        particle_radius: 0.045,
        solver_iterations: 5,
        ..plain_params()
    };
    let mut fluid = Fluid::new_grid(5, 5, 5, Vec3::ZERO, spacing);

    fluid.step(StepTiming::new(60.0, 1.0), &params, &[], &[]);

    // Center of the 5x5x5 lattice
    let center = 2 * 25 + 2 * 5 + 2;
    let constraint = fluid.particles[center].density_est / params.rest_density - 1.0;
    assert!(
        constraint.abs() < 0.1,
        "interior density off rest: C = {}",
        constraint
    );
}

// =============================================================================
// SELF-COLLISION
// =============================================================================

#[test]
fn overlapping_pair_separates_to_contact_distance() {
    // Two particles 1.5 radii apart. An enormous rest density makes the
    // constraint correction negligible, leaving the collision pass as the
    // only meaningful position change.
    let params = FluidParams {
        rest_density: 1e9,
        particle_radius: 0.1,
        smoothing_radius: 0.1,
        solver_iterations: 1,
        s_corr_strength: 0.0,
        ..plain_params()
    };
    let mut fluid = Fluid::new_grid(2, 1, 1, Vec3::ZERO, 1.5 * params.particle_radius);

    fluid.step(StepTiming::new(60.0, 1.0), &params, &[], &[]);

    let separation = (fluid.particles[0].position - fluid.particles[1].position).length();
    assert!(
        separation >= 2.0 * params.particle_radius - 1e-4,
        "pair still overlapping: separation {}",
        separation
    );
}

// =============================================================================
// GRAVITY AND PRIMITIVE COLLISION
// =============================================================================

#[test]
fn cloud_falls_under_gravity() {
    let mut fluid = Fluid::new_random(
        60,
        Vec3::new(-0.5, 0.0, -1.0),
        Vec3::new(0.5, 0.5, 0.0),
        7,
    );
    let start_mean: f32 =
        fluid.particles.iter().map(|p| p.position.y).sum::<f32>() / 60.0;

    let timing = StepTiming::new(60.0, 1.0);
    for _ in 0..10 {
        fluid.step(timing, &plain_params(), &[GRAVITY], &[]);
    }

    let end_mean: f32 = fluid.particles.iter().map(|p| p.position.y).sum::<f32>() / 60.0;
    assert!(
        end_mean < start_mean - 0.01,
        "cloud did not fall: {} -> {}",
        start_mean,
        end_mean
    );
}

#[test]
fn floor_plane_contains_falling_cloud() {
    let mut fluid = Fluid::new_random(
        80,
        Vec3::new(-0.5, 0.1, -1.0),
        Vec3::new(0.5, 0.6, 0.0),
        11,
    );
    let timing = StepTiming::new(60.0, 1.0);
    let floor = Collider::plane(Vec3::ZERO, Vec3::Y, 0.1);

    for _ in 0..60 {
        fluid.step(timing, &plain_params(), &[GRAVITY], &[floor]);
    }

    for p in &fluid.particles {
        assert!(
            p.position.y > -1e-3,
            "particle fell through floor: y = {}",
            p.position.y
        );
    }
}

// =============================================================================
// RESET
// =============================================================================

#[test]
fn reset_restores_cloud_and_clears_motion() {
    let mut fluid = Fluid::new_random(
        40,
        Vec3::new(-0.5, 0.0, -1.0),
        Vec3::new(0.5, 0.5, 0.0),
        3,
    );
    let start: Vec<Vec3> = fluid.particles.iter().map(|p| p.position).collect();

    let timing = StepTiming::new(60.0, 1.0);
    for _ in 0..15 {
        fluid.step(timing, &FluidParams::default(), &[GRAVITY], &[]);
    }
    fluid.reset();

    for (p, s) in fluid.particles.iter().zip(&start) {
        assert_eq!(p.position, *s);
        assert_eq!(p.next_position, *s);
        assert_eq!(p.velocity, Vec3::ZERO);
        assert_eq!(p.forces, Vec3::ZERO);
    }

    // A second reset changes nothing.
    fluid.reset();
    for (p, s) in fluid.particles.iter().zip(&start) {
        assert_eq!(p.position, *s);
    }
}

#[test]
fn reset_reproduces_the_same_trajectory() {
    let timing = StepTiming::new(60.0, 1.0);
    let params = FluidParams::default();
    let mut fluid = Fluid::new_random(
        30,
        Vec3::new(-0.5, 0.0, -1.0),
        Vec3::new(0.5, 0.5, 0.0),
        21,
    );

    for _ in 0..8 {
        fluid.step(timing, &params, &[GRAVITY], &[]);
    }
    let first_run: Vec<Vec3> = fluid.particles.iter().map(|p| p.position).collect();

    fluid.reset();
    for _ in 0..8 {
        fluid.step(timing, &params, &[GRAVITY], &[]);
    }

    for (p, expected) in fluid.particles.iter().zip(&first_run) {
        assert_eq!(p.position, *expected, "trajectory diverged after reset");
    }
}

//! Position Based Fluids solver.
//!
//! Implements the density-constraint projection of Macklin & Muller 2013:
//! predict positions, find neighbors, then iterate density / lambda /
//! position-correction passes before committing. Vorticity confinement and
//! XSPH viscosity run once per step at finalize. The artificial-pressure and
//! vorticity terms are the approximate teaching-quality forms, not a
//! production SPH.
//!
//! Every correction (constraint delta, self-collision, primitive collision)
//! applies to the predicted position; `position` is committed once at the
//! end of the step, so it stays authoritative between frames.

use glam::Vec3;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::collision::Collider;
use crate::constants::MIN_SEPARATION;
use crate::kdtree::KdTree;
use crate::kernels::{cubic_spline, cubic_spline_gradient};
use crate::particle::FluidParticle;
use crate::StepTiming;

/// Fluid simulation parameters, consumed per step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FluidParams {
    /// Rest density rho_0 the constraint drives toward
    pub rest_density: f32,
    pub particle_mass: f32,
    /// Smoothing kernel radius h; the kernel support ends at 2h
    pub smoothing_radius: f32,
    /// Radius used for particle-particle collision
    pub particle_radius: f32,
    /// Constraint projection iterations per step
    pub solver_iterations: u32,
    /// Stabilizer added to the lambda denominator
    pub relaxation_epsilon: f32,
    /// Artificial pressure strength k in s_corr
    pub s_corr_strength: f32,
    /// Reference separation delta_q for s_corr, as a fraction of h
    pub s_corr_dq_scale: f32,
    /// Scale on the pairwise self-collision correction
    pub bounce: f32,
    /// Vorticity confinement strength
    pub vorticity_epsilon: f32,
    /// XSPH viscosity coefficient
    pub viscosity: f32,
}

impl Default for FluidParams {
    fn default() -> Self {
        Self {
            rest_density: 1000.0,
            particle_mass: 1.0,
            smoothing_radius: 0.1,
            particle_radius: 0.025,
            solver_iterations: 4,
            relaxation_epsilon: 100.0,
            s_corr_strength: 0.001,
            s_corr_dq_scale: 0.2,
            bounce: 1.0,
            vorticity_epsilon: 0.01,
            viscosity: 0.01,
        }
    }
}

pub struct Fluid {
    pub particles: Vec<FluidParticle>,

    // Per-step scratch, reused across steps
    tree: KdTree,
    neighbors: Vec<Vec<usize>>,
    predicted: Vec<Vec3>,
    velocity_scratch: Vec<Vec3>,
}

impl Fluid {
    /// Build a cloud of `count` particles uniformly distributed in the given
    /// bounding volume. Equal seeds build identical clouds.
    pub fn new_random(count: usize, bounds_min: Vec3, bounds_max: Vec3, seed: u64) -> Self {
        assert!(count > 0, "particle count must be positive");
        assert!(
            bounds_min.x < bounds_max.x
                && bounds_min.y < bounds_max.y
                && bounds_min.z < bounds_max.z,
            "bounding volume is empty: {:?}..{:?}",
            bounds_min,
            bounds_max
        );

        let mut rng = StdRng::seed_from_u64(seed);
        let positions = (0..count)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(bounds_min.x..bounds_max.x),
                    rng.gen_range(bounds_min.y..bounds_max.y),
                    rng.gen_range(bounds_min.z..bounds_max.z),
                )
            })
            .collect();
        Self::from_positions(positions)
    }

    /// Build a structured lattice of nx * ny * nz particles starting at
    /// `origin` with uniform `spacing`.
    pub fn new_grid(nx: usize, ny: usize, nz: usize, origin: Vec3, spacing: f32) -> Self {
        assert!(nx > 0 && ny > 0 && nz > 0, "lattice dimensions must be positive");
        assert!(spacing > 0.0, "spacing must be positive, got {}", spacing);

        let mut positions = Vec::with_capacity(nx * ny * nz);
        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    positions.push(
                        origin + Vec3::new(i as f32, j as f32, k as f32) * spacing,
                    );
                }
            }
        }
        Self::from_positions(positions)
    }

    fn from_positions(positions: Vec<Vec3>) -> Self {
        let count = positions.len();
        log::debug!("built fluid cloud: {} particles", count);
        Self {
            particles: positions.into_iter().map(FluidParticle::new).collect(),
            tree: KdTree::new(),
            neighbors: vec![Vec::new(); count],
            predicted: Vec::with_capacity(count),
            velocity_scratch: Vec::with_capacity(count),
        }
    }

    /// Advance the fluid by one substep.
    pub fn step(
        &mut self,
        timing: StepTiming,
        params: &FluidParams,
        external_accelerations: &[Vec3],
        colliders: &[Collider],
    ) {
        assert!(params.particle_mass > 0.0, "particle mass must be positive");
        assert!(params.smoothing_radius > 0.0, "smoothing radius must be positive");
        assert!(params.rest_density > 0.0, "rest density must be positive");
        assert!(params.particle_radius > 0.0, "particle radius must be positive");

        let dt = timing.dt();

        // Predict: integrate external accelerations plus any force deposited
        // by the previous step's finalize (vorticity confinement).
        for p in self.particles.iter_mut() {
            let mut accel: Vec3 = external_accelerations.iter().sum();
            accel += p.forces / params.particle_mass;
            p.forces = Vec3::ZERO;
            p.velocity += dt * accel;
            p.next_position = p.position + dt * p.velocity;
        }

        self.find_neighbors(params);

        // Density, lambda, and the position update each read the values the
        // current iteration just produced; this ordering is what makes the
        // projection converge.
        for _ in 0..params.solver_iterations {
            self.compute_densities(params);
            self.compute_lambdas(params);
            self.compute_position_updates(params);
            self.self_collide(params);

            for collider in colliders {
                for p in self.particles.iter_mut() {
                    let tentative = p.next_position + p.delta_pos;
                    let corrected = collider.collide(p.position, tentative);
                    p.delta_pos = corrected - p.next_position;
                }
            }

            for p in self.particles.iter_mut() {
                p.next_position += p.delta_pos;
                p.delta_pos = Vec3::ZERO;
            }
        }

        self.finalize(params, dt);
    }

    /// Restore every particle to its construction-time state.
    pub fn reset(&mut self) {
        for p in self.particles.iter_mut() {
            p.reset();
        }
    }

    /// Rebuild the radius-search tree over predicted positions and refresh
    /// the per-particle neighbor lists (kernel support radius, self dropped).
    fn find_neighbors(&mut self, params: &FluidParams) {
        self.predicted.clear();
        self.predicted
            .extend(self.particles.iter().map(|p| p.next_position));
        self.tree.rebuild(&self.predicted);

        let support = 2.0 * params.smoothing_radius;
        let Fluid { tree, neighbors, predicted, .. } = self;
        for (i, list) in neighbors.iter_mut().enumerate() {
            tree.radius_search(predicted[i], support, list);
            list.retain(|&j| j != i);
        }
    }

    fn compute_densities(&mut self, params: &FluidParams) {
        let h = params.smoothing_radius;
        let self_weight = cubic_spline(0.0, h);
        for i in 0..self.particles.len() {
            let pos = self.particles[i].next_position;
            let mut sum = self_weight;
            for &j in &self.neighbors[i] {
                sum += cubic_spline((pos - self.particles[j].next_position).length(), h);
            }
            self.particles[i].density_est = params.particle_mass * sum;
        }
    }

    fn compute_lambdas(&mut self, params: &FluidParams) {
        let h = params.smoothing_radius;
        let rho0 = params.rest_density;
        for i in 0..self.particles.len() {
            let pos = self.particles[i].next_position;
            let constraint = self.particles[i].density_est / rho0 - 1.0;

            // Denominator sums |grad_k C_i|^2 over every k: the negated
            // per-neighbor gradients plus the self gradient (their sum).
            let mut grad_self = Vec3::ZERO;
            let mut denom = params.relaxation_epsilon;
            for &j in &self.neighbors[i] {
                let grad = cubic_spline_gradient(pos - self.particles[j].next_position, h);
                grad_self += grad;
                denom += (grad / rho0).length_squared();
            }
            denom += (grad_self / rho0).length_squared();

            self.particles[i].lambda = -constraint / denom;
        }
    }

    fn compute_position_updates(&mut self, params: &FluidParams) {
        let h = params.smoothing_radius;
        let dq = params.s_corr_dq_scale * h;
        let w_dq = cubic_spline(dq, h);
        for i in 0..self.particles.len() {
            let pos = self.particles[i].next_position;
            let lambda_i = self.particles[i].lambda;

            let mut delta = Vec3::ZERO;
            for &j in &self.neighbors[i] {
                let r = pos - self.particles[j].next_position;
                let s_corr = if w_dq > 0.0 {
                    -params.s_corr_strength * (cubic_spline(r.length(), h) / w_dq).powi(4)
                } else {
                    0.0
                };
                delta += (lambda_i + self.particles[j].lambda + s_corr)
                    * cubic_spline_gradient(r, h);
            }
            self.particles[i].delta_pos = delta / params.rest_density;
        }
    }

    /// Symmetric pairwise separation of overlapping particles, accumulated
    /// into the pending corrections. Each unordered pair is visited once.
    fn self_collide(&mut self, params: &FluidParams) {
        let min_separation = 2.0 * params.particle_radius;
        for i in 0..self.particles.len() {
            for idx in 0..self.neighbors[i].len() {
                let j = self.neighbors[i][idx];
                if j <= i {
                    continue;
                }
                let pi = self.particles[i].next_position + self.particles[i].delta_pos;
                let pj = self.particles[j].next_position + self.particles[j].delta_pos;
                let away = pi - pj;
                let dist = away.length();
                let penetration = min_separation - dist;
                if penetration > 0.0 && dist > MIN_SEPARATION {
                    let correction = away / dist * (0.5 * params.bounce * penetration);
                    self.particles[i].delta_pos += correction;
                    self.particles[j].delta_pos -= correction;
                }
            }
        }
    }

    fn finalize(&mut self, params: &FluidParams, dt: f32) {
        let h = params.smoothing_radius;

        for p in self.particles.iter_mut() {
            p.velocity = (p.next_position - p.position) / dt;
        }

        // Vorticity, then its confinement force. The force is deposited into
        // the accumulator and picked up by the next step's predict.
        for i in 0..self.particles.len() {
            let pos = self.particles[i].next_position;
            let vel = self.particles[i].velocity;
            let mut omega = Vec3::ZERO;
            for &j in &self.neighbors[i] {
                let grad = cubic_spline_gradient(pos - self.particles[j].next_position, h);
                omega += (vel - self.particles[j].velocity).cross(grad);
            }
            self.particles[i].vorticity = omega;
        }
        for i in 0..self.particles.len() {
            let pos = self.particles[i].next_position;
            let mut eta = Vec3::ZERO;
            for &j in &self.neighbors[i] {
                eta += self.particles[j].vorticity.length()
                    * cubic_spline_gradient(pos - self.particles[j].next_position, h);
            }
            if let Some(direction) = eta.try_normalize() {
                let vorticity = self.particles[i].vorticity;
                self.particles[i].forces += params.vorticity_epsilon * direction.cross(vorticity);
            }
        }

        // XSPH smoothing over the pre-smoothing velocity field.
        self.velocity_scratch.clear();
        self.velocity_scratch
            .extend(self.particles.iter().map(|p| p.velocity));
        for i in 0..self.particles.len() {
            let pos = self.particles[i].next_position;
            let mut correction = Vec3::ZERO;
            for &j in &self.neighbors[i] {
                let w = cubic_spline((pos - self.particles[j].next_position).length(), h);
                correction += (self.velocity_scratch[j] - self.velocity_scratch[i]) * w;
            }
            self.particles[i].velocity += params.viscosity * correction;
        }

        for p in self.particles.iter_mut() {
            p.position = p.next_position;
        }
    }
}

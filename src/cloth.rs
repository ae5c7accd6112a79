//! Mass-spring cloth solver.
//!
//! A regular grid of point masses connected by structural, shearing, and
//! bending springs, integrated with explicit Verlet. Each step runs force
//! accumulation, integration, hash-grid self-collision, primitive collision,
//! and Provot strain limiting, in that order. Pinned point masses never move
//! through any phase.

use glam::Vec3;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::collision::Collider;
use crate::constants::{
    BENDING_FORCE_SCALE, HASH_CELL_SPAN, MAX_STRAIN_RATIO, MIN_SEPARATION,
};
use crate::particle::PointMass;
use crate::spatial::SpatialHash;
use crate::spring::{Spring, SpringKind};
use crate::StepTiming;

/// Initial plane of the cloth grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    /// Laid flat at y = 1, spanning x/z
    Horizontal,
    /// Hanging in the x/y plane, with small seeded z jitter so perfectly
    /// coplanar masses do not stay coplanar under compression
    Vertical,
}

/// Cloth simulation parameters, consumed per step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClothParams {
    /// Areal density; per-particle mass is width * height * density / (W * H)
    pub density: f32,
    /// Hookean spring constant
    pub ks: f32,
    /// Velocity damping as a percentage (0 - 100)
    pub damping: f32,
    pub enable_structural: bool,
    pub enable_shearing: bool,
    pub enable_bending: bool,
}

impl Default for ClothParams {
    fn default() -> Self {
        Self {
            density: 15.0,
            ks: 5000.0,
            damping: 0.2,
            enable_structural: true,
            enable_shearing: true,
            enable_bending: true,
        }
    }
}

impl ClothParams {
    fn kind_enabled(&self, kind: SpringKind) -> bool {
        match kind {
            SpringKind::Structural => self.enable_structural,
            SpringKind::Shearing => self.enable_shearing,
            SpringKind::Bending => self.enable_bending,
        }
    }
}

pub struct Cloth {
    pub width: f32,
    pub height: f32,
    pub num_width_points: usize,
    pub num_height_points: usize,
    /// Half the minimum allowed separation between point masses
    pub thickness: f32,
    pub orientation: Orientation,
    pub point_masses: Vec<PointMass>,
    pub springs: Vec<Spring>,
    spatial: SpatialHash,
}

impl Cloth {
    /// Build a W x H grid of point masses and its spring network.
    ///
    /// `pinned` lists (i, j) grid coordinates that never move. `seed` fixes
    /// the out-of-plane jitter of vertical cloth, so equal seeds build
    /// identical grids.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        width: f32,
        height: f32,
        num_width_points: usize,
        num_height_points: usize,
        thickness: f32,
        orientation: Orientation,
        pinned: &[(usize, usize)],
        seed: u64,
    ) -> Self {
        assert!(width > 0.0, "width must be positive, got {}", width);
        assert!(height > 0.0, "height must be positive, got {}", height);
        assert!(
            num_width_points >= 2 && num_height_points >= 2,
            "grid needs at least 2 points per axis, got {}x{}",
            num_width_points,
            num_height_points
        );
        assert!(thickness > 0.0, "thickness must be positive, got {}", thickness);

        let mut rng = StdRng::seed_from_u64(seed);
        let w_step = width / (num_width_points - 1) as f32;
        let h_step = height / (num_height_points - 1) as f32;

        let mut point_masses = Vec::with_capacity(num_width_points * num_height_points);
        for j in 0..num_height_points {
            for i in 0..num_width_points {
                let position = match orientation {
                    Orientation::Horizontal => {
                        Vec3::new(i as f32 * w_step, 1.0, j as f32 * h_step)
                    }
                    Orientation::Vertical => Vec3::new(
                        i as f32 * w_step,
                        j as f32 * h_step,
                        rng.gen_range(-1e-3..=1e-3),
                    ),
                };
                let is_pinned = pinned.contains(&(i, j));
                point_masses.push(PointMass::new(position, is_pinned));
            }
        }

        // Link only up/left neighbors during the raster pass so every spring
        // is created exactly once.
        let index = |i: usize, j: usize| j * num_width_points + i;
        let mut springs = Vec::new();
        let mut link = |a: usize, b: usize, kind: SpringKind| {
            let rest = (point_masses[a].position - point_masses[b].position).length();
            springs.push(Spring::new(a, b, kind, rest));
        };
        for j in 0..num_height_points {
            for i in 0..num_width_points {
                let curr = index(i, j);
                if j > 0 {
                    link(curr, index(i, j - 1), SpringKind::Structural);
                }
                if i > 0 {
                    link(curr, index(i - 1, j), SpringKind::Structural);
                }
                if j > 0 && i > 0 {
                    link(curr, index(i - 1, j - 1), SpringKind::Shearing);
                }
                if j > 0 && i < num_width_points - 1 {
                    link(curr, index(i + 1, j - 1), SpringKind::Shearing);
                }
                if i > 1 {
                    link(curr, index(i - 2, j), SpringKind::Bending);
                }
                if j > 1 {
                    link(curr, index(i, j - 2), SpringKind::Bending);
                }
            }
        }

        // Hash cells span a few grid spacings so a cell only ever holds true
        // near neighbors.
        let cell_x = HASH_CELL_SPAN * width / num_width_points as f32;
        let cell_y = HASH_CELL_SPAN * height / num_height_points as f32;
        let cell_z = cell_x.max(cell_y);
        let spatial = SpatialHash::new(cell_x, cell_y, cell_z);

        log::debug!(
            "built cloth grid: {} point masses, {} springs",
            point_masses.len(),
            springs.len()
        );

        Self {
            width,
            height,
            num_width_points,
            num_height_points,
            thickness,
            orientation,
            point_masses,
            springs,
            spatial,
        }
    }

    /// Flat index of grid coordinate (i, j).
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        j * self.num_width_points + i
    }

    /// Point mass at grid coordinate (i, j).
    pub fn point_mass(&self, i: usize, j: usize) -> &PointMass {
        &self.point_masses[self.index(i, j)]
    }

    /// Advance the cloth by one substep.
    pub fn step(
        &mut self,
        timing: StepTiming,
        params: &ClothParams,
        external_accelerations: &[Vec3],
        colliders: &[Collider],
    ) {
        assert!(params.density > 0.0, "density must be positive, got {}", params.density);
        assert!(
            (0.0..=100.0).contains(&params.damping),
            "damping is a percentage, got {}",
            params.damping
        );

        let mass = self.width * self.height * params.density
            / (self.num_width_points * self.num_height_points) as f32;
        let dt = timing.dt();

        self.accumulate_forces(params, mass, external_accelerations);
        self.integrate(params, mass, dt);
        self.self_collide(timing.steps_per_frame);

        for collider in colliders {
            for pm in self.point_masses.iter_mut() {
                if pm.pinned {
                    continue;
                }
                pm.position = collider.collide(pm.last_position, pm.position);
            }
        }

        self.limit_strain();
    }

    /// Restore every point mass to its construction-time position.
    pub fn reset(&mut self) {
        for pm in self.point_masses.iter_mut() {
            pm.reset();
        }
    }

    fn accumulate_forces(&mut self, params: &ClothParams, mass: f32, accelerations: &[Vec3]) {
        for pm in self.point_masses.iter_mut() {
            pm.forces = Vec3::ZERO;
            for a in accelerations {
                pm.forces += *a * mass;
            }
        }

        for spring in &self.springs {
            if !params.kind_enabled(spring.kind) {
                continue;
            }
            let axis =
                self.point_masses[spring.b].position - self.point_masses[spring.a].position;
            let len = axis.length();
            if len < MIN_SEPARATION {
                // Coincident endpoints have no axis to pull along.
                continue;
            }
            let mut magnitude = params.ks * (len - spring.rest_length);
            if spring.kind == SpringKind::Bending {
                magnitude *= BENDING_FORCE_SCALE;
            }
            let force = axis / len * magnitude;
            self.point_masses[spring.a].forces += force;
            self.point_masses[spring.b].forces -= force;
        }

        for pm in self.point_masses.iter_mut() {
            if pm.pinned {
                pm.forces = Vec3::ZERO;
            }
        }
    }

    fn integrate(&mut self, params: &ClothParams, mass: f32, dt: f32) {
        let keep = 1.0 - params.damping / 100.0;
        for pm in self.point_masses.iter_mut() {
            if pm.pinned {
                continue;
            }
            let new_position =
                pm.position + keep * (pm.position - pm.last_position) + pm.forces / mass * dt * dt;
            pm.last_position = pm.position;
            pm.position = new_position;
        }
    }

    fn self_collide(&mut self, steps_per_frame: f32) {
        let Cloth { spatial, point_masses, thickness, .. } = self;
        let thickness = *thickness;

        spatial.rebuild(point_masses.iter().map(|pm| pm.position));

        for i in 0..point_masses.len() {
            if point_masses[i].pinned {
                continue;
            }
            let pos = point_masses[i].position;
            let mut total = Vec3::ZERO;
            let mut count = 0u32;
            for &j in spatial.occupants(pos) {
                if j == i {
                    continue;
                }
                let away = pos - point_masses[j].position;
                let dist = away.length();
                let penetration = 2.0 * thickness - dist;
                if penetration > 0.0 && dist > MIN_SEPARATION {
                    total += away / dist * penetration;
                    count += 1;
                }
            }
            if count > 0 {
                point_masses[i].position += total / count as f32 / steps_per_frame;
            }
        }
    }

    /// Provot strain limiting: no spring may stretch past 110% of rest.
    fn limit_strain(&mut self) {
        for spring in &self.springs {
            let a = spring.a;
            let b = spring.b;
            let axis = self.point_masses[b].position - self.point_masses[a].position;
            let len = axis.length();
            let over = len - spring.rest_length * MAX_STRAIN_RATIO;
            if over <= 0.0 || len < MIN_SEPARATION {
                continue;
            }
            let dir = axis / len;
            match (self.point_masses[a].pinned, self.point_masses[b].pinned) {
                (false, false) => {
                    self.point_masses[a].position += dir * (over * 0.5);
                    self.point_masses[b].position -= dir * (over * 0.5);
                }
                (true, false) => self.point_masses[b].position -= dir * over,
                (false, true) => self.point_masses[a].position += dir * over,
                (true, true) => {}
            }
        }
    }
}

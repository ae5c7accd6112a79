//! Uniform spatial hash grid for cloth self-collision.
//!
//! Positions are discretized into axis-aligned cells; each cell holds the
//! indices of the point masses currently inside it. The grid is a scratch
//! structure: it is rebuilt from current positions every step and bucket
//! storage is reused across rebuilds. Queries return same-cell occupants
//! only - cell sizing (a multiple of the cloth grid spacing) keeps every
//! near neighbor of a point mass inside its own cell.

use glam::Vec3;
use rustc_hash::FxHashMap;

/// Discretized cell coordinate.
type CellKey = (i32, i32, i32);

pub struct SpatialHash {
    cell_x: f32,
    cell_y: f32,
    cell_z: f32,
    buckets: FxHashMap<CellKey, Vec<usize>>,
}

impl SpatialHash {
    /// Create a grid with per-axis cell extents.
    pub fn new(cell_x: f32, cell_y: f32, cell_z: f32) -> Self {
        assert!(cell_x > 0.0, "cell_x must be positive, got {}", cell_x);
        assert!(cell_y > 0.0, "cell_y must be positive, got {}", cell_y);
        assert!(cell_z > 0.0, "cell_z must be positive, got {}", cell_z);
        Self {
            cell_x,
            cell_y,
            cell_z,
            buckets: FxHashMap::default(),
        }
    }

    /// Cell containing `position`.
    #[inline]
    pub fn cell_of(&self, position: Vec3) -> CellKey {
        (
            (position.x / self.cell_x).floor() as i32,
            (position.y / self.cell_y).floor() as i32,
            (position.z / self.cell_z).floor() as i32,
        )
    }

    /// Rebuild the grid from scratch. Buckets emptied by a previous rebuild
    /// keep their allocation.
    pub fn rebuild(&mut self, positions: impl IntoIterator<Item = Vec3>) {
        for bucket in self.buckets.values_mut() {
            bucket.clear();
        }
        for (index, position) in positions.into_iter().enumerate() {
            let key = self.cell_of(position);
            self.buckets.entry(key).or_default().push(index);
        }
    }

    /// Indices of all particles whose cell contains `position` at the last
    /// rebuild. A position outside every occupied cell yields an empty slice.
    pub fn occupants(&self, position: Vec3) -> &[usize] {
        self.buckets
            .get(&self.cell_of(position))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

//! K-d tree radius search for fluid neighbor queries.
//!
//! The tree is a balanced median split over a flat node arena, rebuilt from
//! predicted particle positions every step. Node, point, and index storage
//! is reused across rebuilds; the tree never holds data from a previous
//! frame after `rebuild` returns.

use std::cmp::Ordering;

use glam::Vec3;

struct KdNode {
    /// Index of the particle stored at this node
    point: usize,
    /// Split axis (0 = x, 1 = y, 2 = z)
    axis: usize,
    left: i32,
    right: i32,
}

pub struct KdTree {
    nodes: Vec<KdNode>,
    points: Vec<Vec3>,
    indices: Vec<usize>,
    root: i32,
}

impl KdTree {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            points: Vec::new(),
            indices: Vec::new(),
            root: -1,
        }
    }

    /// Rebuild the tree over `points`. Previous contents are discarded.
    pub fn rebuild(&mut self, points: &[Vec3]) {
        self.points.clear();
        self.points.extend_from_slice(points);
        self.indices.clear();
        self.indices.extend(0..points.len());
        self.nodes.clear();

        let mut indices = std::mem::take(&mut self.indices);
        self.root = Self::build(&mut self.nodes, &self.points, &mut indices, 0);
        self.indices = indices;
    }

    /// Recursively split `idx` at the median of the cycling axis.
    fn build(nodes: &mut Vec<KdNode>, points: &[Vec3], idx: &mut [usize], depth: usize) -> i32 {
        if idx.is_empty() {
            return -1;
        }
        let axis = depth % 3;
        let mid = idx.len() / 2;
        idx.select_nth_unstable_by(mid, |&a, &b| {
            points[a][axis]
                .partial_cmp(&points[b][axis])
                .unwrap_or(Ordering::Equal)
        });
        let point = idx[mid];

        let node_index = nodes.len() as i32;
        nodes.push(KdNode { point, axis, left: -1, right: -1 });

        let (lower, rest) = idx.split_at_mut(mid);
        let upper = &mut rest[1..];
        let left = Self::build(nodes, points, lower, depth + 1);
        let right = Self::build(nodes, points, upper, depth + 1);
        nodes[node_index as usize].left = left;
        nodes[node_index as usize].right = right;
        node_index
    }

    /// Collect indices of all points within `radius` of `center` (inclusive)
    /// into `out`. The buffer is cleared first so callers can reuse it.
    pub fn radius_search(&self, center: Vec3, radius: f32, out: &mut Vec<usize>) {
        out.clear();
        if self.root >= 0 {
            self.search(self.root, center, radius, radius * radius, out);
        }
    }

    fn search(&self, node: i32, center: Vec3, radius: f32, radius_sq: f32, out: &mut Vec<usize>) {
        let n = &self.nodes[node as usize];
        let p = self.points[n.point];
        if (p - center).length_squared() <= radius_sq {
            out.push(n.point);
        }

        // Descend into the half containing the query first; the far half
        // only matters when the splitting plane is within the radius.
        let plane_dist = center[n.axis] - p[n.axis];
        let (near, far) = if plane_dist < 0.0 {
            (n.left, n.right)
        } else {
            (n.right, n.left)
        };
        if near >= 0 {
            self.search(near, center, radius, radius_sq, out);
        }
        if far >= 0 && plane_dist.abs() <= radius {
            self.search(far, center, radius, radius_sq, out);
        }
    }
}

impl Default for KdTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn brute_force(points: &[Vec3], center: Vec3, radius: f32) -> Vec<usize> {
        points
            .iter()
            .enumerate()
            .filter(|(_, p)| (**p - center).length_squared() <= radius * radius)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn empty_tree_returns_nothing() {
        let mut tree = KdTree::new();
        tree.rebuild(&[]);
        let mut out = vec![7];
        tree.radius_search(Vec3::ZERO, 1.0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn matches_brute_force_on_random_cloud() {
        let mut rng = StdRng::seed_from_u64(42);
        let points: Vec<Vec3> = (0..300)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                )
            })
            .collect();

        let mut tree = KdTree::new();
        tree.rebuild(&points);

        let mut found = Vec::new();
        for i in (0..points.len()).step_by(17) {
            let center = points[i];
            for radius in [0.1, 0.3, 0.7] {
                tree.radius_search(center, radius, &mut found);
                let mut expected = brute_force(&points, center, radius);
                let mut got = found.clone();
                got.sort_unstable();
                expected.sort_unstable();
                assert_eq!(got, expected, "mismatch at i={} r={}", i, radius);
            }
        }
    }

    #[test]
    fn boundary_distance_is_inclusive() {
        let points = vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)];
        let mut tree = KdTree::new();
        tree.rebuild(&points);

        let mut out = Vec::new();
        tree.radius_search(Vec3::ZERO, 1.0, &mut out);
        out.sort_unstable();
        assert_eq!(out, vec![0, 1]);
    }

    #[test]
    fn rebuild_replaces_previous_points() {
        let mut tree = KdTree::new();
        tree.rebuild(&[Vec3::ZERO; 10]);
        tree.rebuild(&[Vec3::new(5.0, 5.0, 5.0)]);

        let mut out = Vec::new();
        tree.radius_search(Vec3::ZERO, 1.0, &mut out);
        assert!(out.is_empty());
        tree.radius_search(Vec3::new(5.0, 5.0, 5.0), 0.1, &mut out);
        assert_eq!(out, vec![0]);
    }
}

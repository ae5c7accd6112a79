//! Springs linking pairs of point masses in the cloth grid.

/// Spring classification, following the standard mass-spring cloth model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpringKind {
    /// Horizontal/vertical neighbor
    Structural,
    /// Diagonal neighbor
    Shearing,
    /// Distance-2 neighbor, resists folding
    Bending,
}

/// A spring between two point masses, referenced by index into the cloth's
/// particle array. Rest length is fixed at grid-build time.
#[derive(Clone, Copy, Debug)]
pub struct Spring {
    pub a: usize,
    pub b: usize,
    pub kind: SpringKind,
    pub rest_length: f32,
}

impl Spring {
    pub fn new(a: usize, b: usize, kind: SpringKind, rest_length: f32) -> Self {
        Self { a, b, kind, rest_length }
    }
}

pub(crate) mod tri;
pub(crate) mod tri_graph;

pub(crate) use tri_graph::{core_entrance_vertices, TriGraph};

/// Index of a triangle in the owning [`TriGraph`] storage.
pub(crate) type TriIdx = u32;

/// Sentinel for "no triangle" in neighbour slots and list links.
pub(crate) const ABSENT: TriIdx = TriIdx::MAX;

/// The two edge slots of a triangle other than `except`, for `i` in `{0, 1}`.
pub(crate) const fn remaining_slot(except: usize, i: usize) -> usize {
    (except + 1 + i) % 3
}

//! Mesh generators for tristrip tests.
#![forbid(unsafe_code)]
#![deny(unused)]
#![warn(clippy::all, clippy::missing_const_for_fn)]

use rand::{thread_rng, Rng};

/// Vertex ids of a `cols x rows` quad grid, two triangles per cell.
///
/// All triangles are wound consistently, so orientation-preserving
/// stripification is meaningful on this mesh.
pub fn grid_ids(cols: usize, rows: usize) -> Vec<u32> {
    let stride = (cols + 1) as u32;
    let mut ids = Vec::with_capacity(cols * rows * 6);

    for row in 0..rows {
        for col in 0..cols {
            let top_left = (row as u32) * stride + (col as u32);
            let top_right = top_left + 1;
            let bottom_left = top_left + stride;
            let bottom_right = bottom_left + 1;

            ids.extend_from_slice(&[top_left, bottom_left, bottom_right]);
            ids.extend_from_slice(&[top_left, bottom_right, top_right]);
        }
    }

    ids
}

/// Vertex ids of a consistently wound triangle fan of `n` triangles around
/// vertex 0.
pub fn fan_ids(n: usize) -> Vec<u32> {
    let mut ids = Vec::with_capacity(n * 3);

    for i in 0..n as u32 {
        ids.extend_from_slice(&[0, i + 1, i + 2]);
    }

    ids
}

/// A random triangle soup of `tris_count` triangles over ids below `max_id`.
///
/// May contain degenerate triangles, duplicates and non-manifold edges.
pub fn soup_ids(tris_count: usize, max_id: u32) -> Vec<u32> {
    let mut rng = thread_rng();
    let mut ids = Vec::with_capacity(tris_count * 3);

    for _ in 0..tris_count * 3 {
        ids.push(rng.gen_range(0..max_id));
    }

    ids
}

//! The greedy "stripify" algorithm: grow one strip at a time across the
//! adjacency graph, always seeding at a triangle with the fewest unstripped
//! neighbours and preferring low-degree, near candidates while growing.

use crate::graph::{core_entrance_vertices, TriGraph, TriIdx};
use crate::strip::Strip;
use crate::VertexId;

pub(crate) fn create_strips(graph: &mut TriGraph, preserve_orientation: bool) -> Vec<Strip> {
    graph.order_tris();

    let mut strips = Vec::with_capacity(graph.len() / 4);

    // One scratch vector reused across strips to save allocations.
    let mut ids_vec: Vec<VertexId> = Vec::with_capacity((2 + graph.len()).max(32));

    while let Some(seed) = graph.first_seed() {
        debug_assert!(!graph.tri(seed).is_stripped());

        let strip = build_strip(graph, seed, preserve_orientation, &mut ids_vec);
        strips.push(strip);
    }

    strips
}

/// Build a single strip originating from the given first core triangle,
/// advancing it in both directions.
fn build_strip(
    graph: &mut TriGraph,
    first_core: TriIdx,
    preserve_orientation: bool,
    ids_vec: &mut Vec<VertexId>,
) -> Strip {
    graph.set_stripped_and_propagate(first_core);

    let Some((second_core, first_edge, slot_first_to_second)) =
        graph.select_next_core_tri(first_core)
    else {
        // A strip made of a single triangle.
        return Strip {
            ids: graph.tri(first_core).vertices.to_vec(),
        };
    };

    let Some((third_core, second_edge, slot_second_to_third)) =
        graph.select_next_core_tri(second_core)
    else {
        // A strip made of two triangles, emitted in the first one's winding.
        let first = graph.tri(first_core);
        let slot_second_to_first = first.back_slots[slot_first_to_second] as usize;

        let ids = vec![
            first.vertices[(slot_first_to_second + 2) % 3],
            first.vertices[slot_first_to_second],
            first.vertices[(slot_first_to_second + 1) % 3],
            graph.tri(second_core).vertices[(slot_second_to_first + 2) % 3],
        ];

        return Strip { ids };
    };

    let core_entrances = core_entrance_vertices(first_edge, second_edge);

    // The first core triangle starts out oriented correctly iff the backward
    // leg below contributes exactly one id in front of it.
    let oriented_correctly =
        graph.tri(first_core).vertices[slot_first_to_second] == core_entrances[0];

    // Grow backward from the second core triangle across the first.
    build_strip_loop(
        graph,
        first_core,
        slot_first_to_second,
        core_entrances[1],
        core_entrances[0],
        preserve_orientation,
        oriented_correctly,
        ids_vec,
    );

    let prefix_count = ids_vec.len();

    ids_vec.extend_from_slice(&core_entrances);

    // Grow forward from the second core triangle across the third.
    let slot_third_to_second = graph.tri(second_core).back_slots[slot_second_to_third] as usize;
    build_strip_loop(
        graph,
        third_core,
        slot_third_to_second,
        core_entrances[1],
        core_entrances[2],
        false,
        false,
        ids_vec,
    );

    // The backward leg came out reversed; fix its order while assembling.
    let mut ids = Vec::with_capacity(ids_vec.len());
    ids.extend(ids_vec[..prefix_count].iter().rev().copied());
    ids.extend_from_slice(&ids_vec[prefix_count..]);

    ids_vec.clear();

    Strip { ids }
}

/// Advance the strip in one direction until no unstripped neighbour is left.
/// Pushes at least one id.
#[allow(clippy::too_many_arguments)]
fn build_strip_loop(
    graph: &mut TriGraph,
    mut tri: TriIdx,
    mut slot_to_prev: usize,
    mut prev_entrance: VertexId,
    mut entrance: VertexId,
    preserve_orientation: bool,
    mut oriented_correctly: bool,
    ids_vec: &mut Vec<VertexId>,
) {
    loop {
        let candidate = graph.best_growth_candidate(tri, slot_to_prev, entrance);

        if let Some((_, near)) = candidate {
            if near {
                prev_entrance = entrance;

                // One more triangle flips the parity of the first core
                // triangle from even to odd or back.
                oriented_correctly = !oriented_correctly;
            } else {
                // Swap: repeat the previous entrance. The parity stays put
                // because the swap adds a second, degenerate triangle.
                ids_vec.push(prev_entrance);
            }
        }

        // The next entrance sits opposite the shared edge; it always
        // completes the current triangle.
        entrance = graph.tri(tri).vertices[(slot_to_prev + 2) % 3];
        ids_vec.push(entrance);

        let Some((slot, _)) = candidate else {
            // No near and no far neighbour, the strip ends here.
            if preserve_orientation && !oriented_correctly {
                ids_vec.push(entrance);
            }

            return;
        };

        slot_to_prev = graph.tri(tri).back_slots[slot] as usize;
        tri = graph.tri(tri).neighbours[slot];

        graph.set_stripped_and_propagate(tri);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TriGraph;

    fn stripify(ids: &[VertexId], preserve_orientation: bool) -> Vec<Strip> {
        let mut graph = TriGraph::from_ids(ids);
        create_strips(&mut graph, preserve_orientation)
    }

    #[test]
    fn test_single_triangle() {
        let strips = stripify(&[0, 1, 2], false);

        assert_eq!(strips.len(), 1);
        assert_eq!(strips[0].ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_two_triangles_sharing_an_edge() {
        let strips = stripify(&[0, 1, 2, 3, 1, 2], false);

        assert_eq!(strips.len(), 1);
        assert_eq!(strips[0].ids, vec![3, 1, 2, 0]);
    }

    #[test]
    fn test_three_triangle_strip() {
        let strips = stripify(&[0, 1, 2, 3, 1, 2, 4, 2, 3], false);

        assert_eq!(strips.len(), 1);
        assert_eq!(strips[0].ids, vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_disconnected_triangles() {
        let strips = stripify(&[0, 1, 2, 3, 4, 5], false);

        assert_eq!(strips.len(), 2);
        assert_eq!(strips[0].ids.len(), 3);
        assert_eq!(strips[1].ids.len(), 3);
    }

    #[test]
    fn test_degenerate_triangle_dropped() {
        let strips = stripify(&[0, 0, 1, 2, 3, 4], false);

        assert_eq!(strips.len(), 1);
        assert_eq!(strips[0].ids, vec![2, 3, 4]);
    }

    #[test]
    fn test_four_fold_edge() {
        let strips = stripify(&[0, 1, 2, 3, 1, 2, 4, 1, 2, 5, 1, 2], false);

        assert!(strips.len() <= 2);
        for strip in &strips {
            assert!(strip.ids.len() >= 3);
        }
    }

    #[test]
    fn test_orientation_padding_duplicates_leading_vertex_only() {
        let strips = stripify(&[0, 1, 2, 2, 1, 3, 2, 3, 4], true);

        assert_eq!(strips.len(), 1);

        let ids = &strips[0].ids;
        for window in ids[1..].windows(2) {
            assert_ne!(window[0], window[1]);
        }
    }
}

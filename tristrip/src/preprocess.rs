//! Preprocessing for the tunneler: lay down an initial set of strips as
//! strong edges in the graph, collect their endpoints into the endpoint
//! list, and report how many strips were created.

use crate::graph::{core_entrance_vertices, TriGraph, TriIdx};
use crate::VertexId;

/// Make every triangle a strip of its own.
pub(crate) fn isolated(graph: &mut TriGraph) -> usize {
    for idx in 0..graph.len() {
        let idx = idx as TriIdx;

        graph.tri_mut(idx).set_endpoint();
        graph.endpoint_prepend(idx);
    }

    graph.len()
}

/// Greedily pair each triangle with one neighbour.
pub(crate) fn pairs(graph: &mut TriGraph) -> usize {
    graph.order_tris();

    let mut strips_count = 0;

    while let Some(seed) = graph.first_seed() {
        debug_assert!(!graph.tri(seed).is_stripped());

        delineate_pair(graph, seed);
        strips_count += 1;
    }

    strips_count
}

/// Full greedy strip growth. Unlike the strip-emitting variant this one only
/// marks the strips in the graph; the ids are collected after tunneling.
pub(crate) fn stripify(graph: &mut TriGraph) -> usize {
    graph.order_tris();

    let mut strips_count = 0;

    while let Some(seed) = graph.first_seed() {
        debug_assert!(!graph.tri(seed).is_stripped());

        delineate_strip(graph, seed);
        strips_count += 1;
    }

    strips_count
}

fn delineate_pair(graph: &mut TriGraph, first_core: TriIdx) {
    graph.set_stripped_and_propagate(first_core);
    graph.tri_mut(first_core).set_endpoint();
    graph.endpoint_prepend(first_core);

    let Some((second_core, _, slot_first_to_second)) = graph.select_next_core_tri(first_core)
    else {
        return;
    };

    graph.tri_mut(second_core).set_endpoint();
    graph.endpoint_prepend(second_core);

    let slot_second_to_first = graph.tri(first_core).back_slots[slot_first_to_second] as usize;
    graph.tri_mut(first_core).link(slot_first_to_second);
    graph.tri_mut(second_core).link(slot_second_to_first);
}

fn delineate_strip(graph: &mut TriGraph, first_core: TriIdx) {
    graph.set_stripped_and_propagate(first_core);

    let Some((second_core, first_edge, slot_first_to_second)) =
        graph.select_next_core_tri(first_core)
    else {
        // A one-triangle strip: the endpoint counts twice but is listed once.
        graph.tri_mut(first_core).set_endpoint();
        graph.endpoint_prepend(first_core);

        return;
    };

    let slot_second_to_first = graph.tri(first_core).back_slots[slot_first_to_second] as usize;
    graph.tri_mut(first_core).link(slot_first_to_second);
    graph.tri_mut(second_core).link(slot_second_to_first);

    let Some((third_core, second_edge, slot_second_to_third)) =
        graph.select_next_core_tri(second_core)
    else {
        // The two core triangles form a complete strip.
        graph.tri_mut(first_core).set_endpoint();
        graph.endpoint_prepend(first_core);
        graph.tri_mut(second_core).set_endpoint();
        graph.endpoint_prepend(second_core);

        return;
    };

    let slot_third_to_second = graph.tri(second_core).back_slots[slot_second_to_third] as usize;
    graph.tri_mut(second_core).link(slot_second_to_third);
    graph.tri_mut(third_core).link(slot_third_to_second);

    let core_entrances = core_entrance_vertices(first_edge, second_edge);

    // Grow in both directions from the second core triangle.
    let first_end = delineate_strip_loop(
        graph,
        first_core,
        slot_first_to_second,
        core_entrances[0],
    );
    let second_end = delineate_strip_loop(
        graph,
        third_core,
        slot_third_to_second,
        core_entrances[2],
    );

    graph.tri_mut(first_end).set_endpoint();
    graph.endpoint_prepend(first_end);
    graph.tri_mut(second_end).set_endpoint();
    graph.endpoint_prepend(second_end);
}

/// Extend the strip in one direction, linking the crossed edges as strong.
/// Returns the end triangle of this direction.
fn delineate_strip_loop(
    graph: &mut TriGraph,
    mut tri: TriIdx,
    mut slot_to_prev: usize,
    mut entrance: VertexId,
) -> TriIdx {
    loop {
        let Some((slot, _)) = graph.best_growth_candidate(tri, slot_to_prev, entrance) else {
            return tri;
        };

        entrance = graph.tri(tri).vertices[(slot_to_prev + 2) % 3];

        let next = graph.tri(tri).neighbours[slot];
        let next_slot_to_prev = graph.tri(tri).back_slots[slot] as usize;

        graph.tri_mut(tri).link(slot);
        graph.tri_mut(next).link(next_slot_to_prev);

        graph.set_stripped_and_propagate(next);

        tri = next;
        slot_to_prev = next_slot_to_prev;
    }
}

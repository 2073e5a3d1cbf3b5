//! Collection: after tunneling, the strips only exist as strong edges in the
//! graph. Walk them from their endpoints and emit the vertex sequences.

use crate::graph::{core_entrance_vertices, remaining_slot, TriGraph, TriIdx, ABSENT};
use crate::strip::Strip;
use crate::VertexId;

/// Emit one strip per endpoint-list entry that starts a not-yet-collected
/// strip. The terminal endpoint of every walk leaves the list so no strip is
/// emitted a second time in reverse.
pub(crate) fn collect_strips(
    graph: &mut TriGraph,
    strips_count: usize,
    preserve_orientation: bool,
) -> Vec<Strip> {
    let mut strips = Vec::with_capacity(strips_count);
    let mut first_endpoint = graph.endpoint_head();

    for _ in 0..strips_count {
        let (strip, second_endpoint) = collect_strip(graph, first_endpoint, preserve_orientation);
        strips.push(strip);

        if let Some(second_endpoint) = second_endpoint {
            graph.endpoint_remove(second_endpoint);
        }

        first_endpoint = graph.tri(first_endpoint).next;
    }

    // All endpoints must be consumed once every strip has been collected.
    debug_assert_eq!(first_endpoint, ABSENT);

    strips
}

/// Collect the strip starting at the endpoint `first_tri`. Returns the strip
/// and its other endpoint, if it has one.
fn collect_strip(
    graph: &TriGraph,
    first_tri: TriIdx,
    preserve_orientation: bool,
) -> (Strip, Option<TriIdx>) {
    debug_assert!(graph.tri(first_tri).is_endpoint());

    let first = graph.tri(first_tri);

    // The (single) strong edge of the endpoint leads to the second triangle.
    let Some(slot_first_to_second) = (0..3).find(|&slot| first.is_linked(slot)) else {
        // An isolated endpoint is a complete one-triangle strip.
        return (
            Strip {
                ids: first.vertices.to_vec(),
            },
            None,
        );
    };

    let mut slot_to_prev = first.back_slots[slot_first_to_second] as usize;
    let second_tri = first.neighbours[slot_first_to_second];
    let first_edge = [
        first.vertices[slot_first_to_second],
        first.vertices[(slot_first_to_second + 1) % 3],
    ];
    let first_vertex = first.vertices[(slot_first_to_second + 2) % 3];

    if graph.tri(second_tri).is_endpoint() {
        // A two-triangle strip, emitted in the first one's winding.
        let ids = vec![
            first_vertex,
            first.vertices[slot_first_to_second],
            first.vertices[(slot_first_to_second + 1) % 3],
            graph.tri(second_tri).vertices[(slot_to_prev + 2) % 3],
        ];

        return (Strip { ids }, Some(second_tri));
    }

    // Move on to the third triangle across the second one's other strong
    // edge, noting the shared edge on the way.
    let mut third_tri = ABSENT;
    let mut second_edge = [0, 0];

    for i in 0..2 {
        let slot = remaining_slot(slot_to_prev, i);

        if !graph.tri(second_tri).is_linked(slot) {
            continue;
        }

        third_tri = graph.tri(second_tri).neighbours[slot];
        second_edge = [
            graph.tri(second_tri).vertices[slot],
            graph.tri(second_tri).vertices[(slot + 1) % 3],
        ];
        slot_to_prev = graph.tri(second_tri).back_slots[slot] as usize;

        break;
    }

    assert!(
        third_tri != ABSENT,
        "Stranded at the third triangle without linked neighbours!"
    );

    let core_entrances = core_entrance_vertices(first_edge, second_edge);

    let mut ids = Vec::with_capacity(32);
    ids.push(first_vertex);

    // Repeating the first vertex rotates the winding of the whole strip.
    if preserve_orientation && first.vertices[slot_first_to_second] != core_entrances[0] {
        ids.push(first_vertex);
    }

    ids.extend_from_slice(&core_entrances);

    let last_tri = collect_strip_loop(
        graph,
        third_tri,
        slot_to_prev,
        core_entrances[1],
        core_entrances[2],
        &mut ids,
    );

    (Strip { ids }, Some(last_tri))
}

/// Follow the strong edges until the other endpoint, pushing one entrance
/// vertex per triangle and a swap vertex per far transition.
fn collect_strip_loop(
    graph: &TriGraph,
    mut curr_tri: TriIdx,
    mut slot_to_prev: usize,
    mut prev_entrance: VertexId,
    mut curr_entrance: VertexId,
    ids: &mut Vec<VertexId>,
) -> TriIdx {
    loop {
        // The apex opposite the back edge always completes the current
        // triangle, endpoint or not.
        let next_entrance = graph.tri(curr_tri).vertices[(slot_to_prev + 2) % 3];

        let tris_left = graph.traverse_strip(&mut curr_tri, &mut slot_to_prev);

        if tris_left {
            // Near or far? Near iff the edge just crossed contains the
            // current entrance; only far transitions need a swap.
            let near = graph.tri(curr_tri).vertices[slot_to_prev] == curr_entrance
                || graph.tri(curr_tri).vertices[(slot_to_prev + 1) % 3] == curr_entrance;

            if near {
                prev_entrance = curr_entrance;
            } else {
                ids.push(prev_entrance);
            }
        }

        curr_entrance = next_entrance;
        ids.push(curr_entrance);

        if !tris_left {
            return curr_tri;
        }
    }
}

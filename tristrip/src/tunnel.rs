//! Tunneling: merge strips pairwise by flipping the colours along an
//! alternating weak/strong path between two endpoints.
//!
//! A tunnel is a simple path `E1 = T0, T1, ..., Tk = E2` of odd length
//! between two endpoints whose edges alternate starting weak. Turning every
//! weak edge on the path strong and every strong edge weak splices the two
//! strips into one, so each tunnel saves a strip. The search is a
//! depth-limited DFS over the graph; triangles at even stack positions
//! ("red") leave across weak edges, odd ones ("black") across strong edges.

use crate::collect;
use crate::config::{Config, PreprocAlgorithm};
use crate::graph::{remaining_slot, TriGraph, TriIdx, ABSENT};
use crate::preprocess;
use crate::strip::Strip;

/// The ways an attempt to close a tunnel can play out.
enum CementOutcome {
    /// The tunnel has been cemented.
    Success,
    /// A circle was found and backtracking is exhausted; give up the tunnel.
    FailForGood,
    /// A circle was found and the stack was backtracked past it.
    Backtracked,
    /// A circle was found ending at the current endpoint; the caller should
    /// open that endpoint and search deeper instead.
    ShouldOpen,
}

/// Preprocess, tunnel, and collect the surviving strips.
pub(crate) fn create_strips(graph: &mut TriGraph, config: &Config) -> Vec<Strip> {
    let mut strips_count = match config.preproc_algorithm {
        PreprocAlgorithm::Isolated => preprocess::isolated(graph),
        PreprocAlgorithm::Pairs => preprocess::pairs(graph),
        PreprocAlgorithm::Stripify => preprocess::stripify(graph),
    };

    if config.incremental {
        // Exhaust all tunnels of length 2 first, then 4, and so on.
        let mut pass_config = *config;
        let mut depth = 2;

        while depth <= config.max_count {
            pass_config.max_count = depth;
            strips_count = tunnel_all_strips(graph, &pass_config, strips_count);
            depth += 2;
        }
    } else {
        strips_count = tunnel_all_strips(graph, config, strips_count);
    }

    collect::collect_strips(graph, strips_count, config.preserve_orientation)
}

/// Keep sweeping the endpoint list for tunnels until a full sweep finds none
/// (or only one strip is left, or the destination count is reached). Returns
/// the remaining strip count.
fn tunnel_all_strips(graph: &mut TriGraph, config: &Config, mut strips_count: usize) -> usize {
    let mut tunnel = vec![ABSENT; config.max_count];

    loop {
        let mut found_tunnel = false;
        let mut first_endpoint = graph.endpoint_head();

        loop {
            if config.dest_count.is_some_and(|dest| strips_count <= dest) {
                found_tunnel = false;
                break;
            }

            match dig_tunnel(graph, &mut tunnel, first_endpoint, config) {
                None => {
                    first_endpoint = graph.tri(first_endpoint).next;
                }
                Some(second_endpoint) => {
                    found_tunnel = true;
                    strips_count -= 1;

                    log::debug!("tunnel found, {strips_count} strips remaining");

                    // Endpoints that stopped being endpoints leave the list.
                    if !graph.tri(first_endpoint).is_endpoint() {
                        // Continue at our list successor, unless that is the
                        // endpoint we just tunneled to.
                        let next_endpoint = if graph.tri(first_endpoint).next != second_endpoint {
                            graph.tri(first_endpoint).next
                        } else {
                            graph.tri(second_endpoint).next
                        };

                        graph.endpoint_remove(first_endpoint);
                        first_endpoint = next_endpoint;
                    }

                    if !graph.tri(second_endpoint).is_endpoint() {
                        graph.endpoint_remove(second_endpoint);
                    }
                }
            }

            if first_endpoint == ABSENT || strips_count <= 1 {
                break;
            }
        }

        if !found_tunnel || strips_count <= 1 {
            break;
        }
    }

    strips_count
}

/// Search a tunnel starting at `first_endpoint` with a DFS over the `tunnel`
/// stack. On success the colours along the path have been flipped and the
/// second endpoint is returned.
fn dig_tunnel(
    graph: &mut TriGraph,
    tunnel: &mut [TriIdx],
    first_endpoint: TriIdx,
    config: &Config,
) -> Option<TriIdx> {
    debug_assert!(graph.tri(first_endpoint).is_endpoint());

    // Open the first endpoint by hand: it sits at stack position 0 and is
    // therefore red, so every weak edge with a neighbour is a candidate.
    graph.tri_mut(first_endpoint).init_tunnel_state();

    for slot in 0..3 {
        if graph.tri(first_endpoint).neighbours[slot] == ABSENT
            || graph.tri(first_endpoint).is_linked(slot)
        {
            continue;
        }

        graph.tri_mut(first_endpoint).push_tunnel_state(slot);
    }

    if graph.tri(first_endpoint).is_tunnel_state_depleted() {
        return None;
    }

    tunnel[0] = first_endpoint;
    let mut top = 0;
    graph.tri_mut(first_endpoint).set_visited(0);

    let mut loop_count = 0;

    loop {
        if let Some(limit) = config.loop_limit {
            loop_count += 1;

            if loop_count > limit {
                if !config.backtrack_after_loop_limit {
                    log::debug!("tunnel loop limit reached, cancelling");

                    for &tri in &tunnel[..=top] {
                        graph.tri_mut(tri).set_unvisited();
                    }

                    return None;
                }

                log::debug!("tunnel loop limit reached, backtracking to the start");

                if !backtrack_tunnel(graph, tunnel, &mut top, 0) {
                    return None;
                }

                loop_count = 0;
            }
        }

        // The triangle at `top` always carries a selected tunnel state here,
        // and the stack has room for one more.
        debug_assert!(top < config.max_count - 1);

        let last_tri = tunnel[top];
        let successor_slot = graph.tri(last_tri).tunnel_successor_slot();
        let curr_tri = graph.tri(last_tri).neighbours[successor_slot];

        // Opening only records unvisited neighbours.
        debug_assert!(!graph.tri(curr_tri).is_visited());

        top += 1;
        tunnel[top] = curr_tri;
        graph.tri_mut(curr_tri).set_visited(top);

        let curr_is_red = top % 2 == 0;

        // A black endpoint can close the tunnel.
        if !curr_is_red && graph.tri(curr_tri).is_endpoint() {
            match cement_tunnel(graph, tunnel, &mut top) {
                CementOutcome::Success => return Some(curr_tri),
                CementOutcome::FailForGood => return None,
                CementOutcome::Backtracked => continue,
                CementOutcome::ShouldOpen => {}
            }
        }

        debug_assert_eq!(tunnel[top], curr_tri);

        // With a full stack the only way forward is backtracking.
        if top == config.max_count - 1 {
            let target = top - 1;

            if !backtrack_tunnel(graph, tunnel, &mut top, target) {
                return None;
            }

            continue;
        }

        let back_slot = graph.tri(last_tri).back_slots[successor_slot] as usize;

        if !open_tri(graph, curr_tri, back_slot, curr_is_red) {
            let target = top - 1;

            if !backtrack_tunnel(graph, tunnel, &mut top, target) {
                return None;
            }
        }
    }
}

/// Record every valid successor of `tri` in its tunnel state: the neighbour
/// must exist, must not be on the stack already, and the edge colour must
/// match the triangle's own colour (red continues across weak edges, black
/// across strong ones). Returns `false` when no candidate exists.
fn open_tri(graph: &mut TriGraph, tri: TriIdx, slot_to_prev: usize, tri_is_red: bool) -> bool {
    graph.tri_mut(tri).init_tunnel_state();

    for i in 0..2 {
        let slot = remaining_slot(slot_to_prev, i);
        let neighbour = graph.tri(tri).neighbours[slot];

        if neighbour == ABSENT
            || tri_is_red == graph.tri(tri).is_linked(slot)
            || graph.tri(neighbour).is_visited()
        {
            continue;
        }

        graph.tri_mut(tri).push_tunnel_state(slot);
    }

    !graph.tri(tri).is_tunnel_state_depleted()
}

/// Drop the stack back to `target`, then advance the tunnel state there. A
/// depleted triangle is abandoned and its predecessor tried instead, all the
/// way down to the first endpoint. Returns `false` when even that runs dry.
fn backtrack_tunnel(
    graph: &mut TriGraph,
    tunnel: &[TriIdx],
    top: &mut usize,
    target: usize,
) -> bool {
    debug_assert!(target <= *top);

    while *top > target {
        graph.tri_mut(tunnel[*top]).set_unvisited();
        *top -= 1;
    }

    loop {
        let curr_tri = tunnel[*top];

        if graph.tri_mut(curr_tri).select_next_tunnel_state() {
            return true;
        }

        graph.tri_mut(curr_tri).set_unvisited();

        if *top == 0 {
            return false;
        }

        *top -= 1;
    }
}

/// Try to finalize the tunnel on the stack: flip the edge colours along the
/// path, then check for circles. A circle forces a full rollback.
fn cement_tunnel(graph: &mut TriGraph, tunnel: &[TriIdx], top: &mut usize) -> CementOutcome {
    let end = *top;
    let first_endpoint = tunnel[0];
    let second_endpoint = tunnel[end];

    debug_assert!(graph.tri(first_endpoint).is_endpoint());
    debug_assert!(end % 2 == 1 && graph.tri(second_endpoint).is_endpoint());

    // Isolated endpoints stay endpoints: they still end the merged strip.
    let first_is_isolated = graph.tri(first_endpoint).is_isolated();
    let second_is_isolated = graph.tri(second_endpoint).is_isolated();

    // Shadow every link state on the way, then flip: edges leaving red
    // triangles become strong, edges leaving black ones weak.
    graph.tri_mut(first_endpoint).save_link_state();

    for i in 0..end {
        let curr_tri = tunnel[i];
        let curr_is_red = i % 2 == 0;

        let successor_slot = graph.tri(curr_tri).tunnel_successor_slot();
        let back_slot = graph.tri(curr_tri).back_slots[successor_slot] as usize;
        let next_tri = tunnel[i + 1];

        debug_assert_eq!(next_tri, graph.tri(curr_tri).neighbours[successor_slot]);

        graph.tri_mut(next_tri).save_link_state();

        if curr_is_red {
            graph.tri_mut(curr_tri).link(successor_slot);
            graph.tri_mut(next_tri).link(back_slot);
        } else {
            graph.tri_mut(curr_tri).unlink(successor_slot);
            graph.tri_mut(next_tri).unlink(back_slot);
        }
    }

    // Drop the endpoint markers before the circle check; otherwise the strip
    // walks below would back off too early.
    if !first_is_isolated {
        graph.tri_mut(first_endpoint).set_non_endpoint();
    }

    if !second_is_isolated {
        graph.tri_mut(second_endpoint).set_non_endpoint();
    }

    let Some(last_circle_index) = circle_check(graph, tunnel, end) else {
        // No circle; the check has also cleared all the visited flags.
        return CementOutcome::Success;
    };

    // A circle: undo the flips and restore the endpoint and visited state.
    for (i, &tri) in tunnel[..=end].iter().enumerate() {
        graph.tri_mut(tri).set_visited(i);
        graph.tri_mut(tri).restore_link_state();
    }

    graph.tri_mut(first_endpoint).set_endpoint();
    graph.tri_mut(second_endpoint).set_endpoint();

    // When the circle ends right at the current endpoint there is nothing to
    // backtrack; the caller should open that endpoint and dig deeper.
    if last_circle_index == end {
        return CementOutcome::ShouldOpen;
    }

    if backtrack_tunnel(graph, tunnel, top, last_circle_index) {
        CementOutcome::Backtracked
    } else {
        CementOutcome::FailForGood
    }
}

/// Look for circles in the freshly recoloured graph: walk from every tunnel
/// triangle whose outgoing edge just turned strong, forward through its
/// strip. A walk that returns to its starter is a circle; the highest tunnel
/// index seen on that walk is returned. Without a circle, every tunnel
/// triangle ends up unvisited.
fn circle_check(graph: &mut TriGraph, tunnel: &[TriIdx], end: usize) -> Option<usize> {
    let mut i = 0;

    while i < end {
        let starter_tri = tunnel[i];

        // Already unvisited means an earlier walk passed through here and
        // found no circle; there is none through this triangle either.
        if graph.tri(starter_tri).is_visited() {
            let successor_slot = graph.tri(starter_tri).tunnel_successor_slot();
            let mut curr_tri = graph.tri(starter_tri).neighbours[successor_slot];

            debug_assert_eq!(curr_tri, tunnel[i + 1]);

            let mut max_tunnel_index = graph.tri(curr_tri).tunnel_index as usize;
            graph.tri_mut(curr_tri).set_unvisited();

            let mut slot_to_prev = graph.tri(starter_tri).back_slots[successor_slot] as usize;

            while graph.traverse_strip(&mut curr_tri, &mut slot_to_prev) {
                // Only tunnel members are interesting.
                if !graph.tri(curr_tri).is_visited() {
                    continue;
                }

                if curr_tri == starter_tri {
                    return Some(max_tunnel_index);
                }

                max_tunnel_index = max_tunnel_index.max(graph.tri(curr_tri).tunnel_index as usize);
                graph.tri_mut(curr_tri).set_unvisited();
            }

            // Reached an endpoint without meeting the starter again.
            graph.tri_mut(starter_tri).set_unvisited();
        }

        i += 2;
    }

    None
}

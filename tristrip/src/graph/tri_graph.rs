use std::collections::hash_map::Entry;

use fnv::FnvHashMap;

use super::{remaining_slot, tri::Tri, TriIdx, ABSENT};
use crate::VertexId;

/// A half-edge waiting for its partner during neighbour stitching.
struct OpenEdge {
    tri: TriIdx,
    slot: u8,
}

/// An undirected edge key: both vertex ids packed into one value, the lower
/// one in the lower half.
const fn edge_key(v0: VertexId, v1: VertexId) -> u64 {
    let (lower, upper) = if v0 < v1 { (v0, v1) } else { (v1, v0) };
    ((upper as u64) << 32) | (lower as u64)
}

/// The triangle-adjacency graph all stripping passes operate on.
///
/// Triangles live in one contiguous array and reference each other by index.
/// The graph also owns the four adjacency buckets (triangles grouped by their
/// current unstripped-neighbour count) and the endpoint list; both thread
/// through the intrusive `prev`/`next` links of the triangles.
#[derive(Debug)]
pub(crate) struct TriGraph {
    tris: Vec<Tri>,
    /// Heads of the adjacency buckets, indexed by unstripped-neighbour count.
    bucket_heads: [TriIdx; 4],
    /// Head of the endpoint list used while tunneling and collecting.
    endpoint_head: TriIdx,
}

impl TriGraph {
    /// Build triangles from a flat id array and stitch them to their
    /// neighbours. Degenerate triangles (two equal ids) are dropped.
    ///
    /// Neighbour stitching goes through a map of open edges: the first
    /// triangle on an edge parks a half-edge there, the second one splices
    /// the two together and retires the key. Retiring (instead of
    /// overwriting) lets a third and fourth triangle on the same edge pair up
    /// independently; anything beyond four leaves surplus half-edges
    /// unlinked.
    pub(crate) fn from_ids(ids: &[VertexId]) -> Self {
        debug_assert_eq!(ids.len() % 3, 0);

        let mut tris: Vec<Tri> = Vec::with_capacity(ids.len() / 3);
        let mut open_edges: FnvHashMap<u64, OpenEdge> =
            FnvHashMap::with_capacity_and_hasher(ids.len(), Default::default());

        for chunk in ids.chunks_exact(3) {
            let vertices = [chunk[0], chunk[1], chunk[2]];

            if crate::strip::is_degenerate(&vertices) {
                continue;
            }

            let idx = tris.len() as TriIdx;
            tris.push(Tri::new(vertices));

            for slot in 0..3 {
                let key = edge_key(vertices[slot], vertices[(slot + 1) % 3]);

                match open_edges.entry(key) {
                    Entry::Occupied(entry) => {
                        let open = entry.remove();
                        let other = open.tri as usize;
                        let other_slot = open.slot as usize;

                        tris[idx as usize].neighbours[slot] = open.tri;
                        tris[idx as usize].back_slots[slot] = open.slot;
                        tris[idx as usize].unstripped_neighbours += 1;

                        tris[other].neighbours[other_slot] = idx;
                        tris[other].back_slots[other_slot] = slot as u8;
                        tris[other].unstripped_neighbours += 1;
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(OpenEdge {
                            tri: idx,
                            slot: slot as u8,
                        });
                    }
                }
            }
        }

        log::trace!("built {} triangles from {} indices", tris.len(), ids.len());

        Self {
            tris,
            bucket_heads: [ABSENT; 4],
            endpoint_head: ABSENT,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tris.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.tris.is_empty()
    }

    pub(crate) fn tri(&self, idx: TriIdx) -> &Tri {
        &self.tris[idx as usize]
    }

    pub(crate) fn tri_mut(&mut self, idx: TriIdx) -> &mut Tri {
        &mut self.tris[idx as usize]
    }

    pub(crate) const fn endpoint_head(&self) -> TriIdx {
        self.endpoint_head
    }

    /// Sort every triangle into the adjacency bucket matching its
    /// unstripped-neighbour count.
    pub(crate) fn order_tris(&mut self) {
        for idx in 0..self.tris.len() {
            self.bucket_prepend(idx as TriIdx);
        }
    }

    /// Head of the first non-empty adjacency bucket, in ascending count
    /// order. This is the seed with the fewest unstripped neighbours.
    pub(crate) fn first_seed(&self) -> Option<TriIdx> {
        self.bucket_heads.iter().copied().find(|&head| head != ABSENT)
    }

    /// Mark `idx` as stripped, take it out of its bucket, and move every
    /// not-yet-stripped neighbour one bucket down.
    pub(crate) fn set_stripped_and_propagate(&mut self, idx: TriIdx) {
        self.tris[idx as usize].set_stripped();
        self.bucket_remove(idx);

        for slot in 0..3 {
            let neighbour = self.tris[idx as usize].neighbours[slot];

            if neighbour == ABSENT || self.tri(neighbour).is_stripped() {
                continue;
            }

            self.bucket_remove(neighbour);
            self.tris[neighbour as usize].unstripped_neighbours -= 1;
            self.bucket_prepend(neighbour);
        }
    }

    /// Pick the unstripped neighbour of `tri` with the lowest
    /// unstripped-neighbour count as the next core triangle and mark it
    /// stripped. Also returns the shared edge and the slot from `tri`.
    pub(crate) fn select_next_core_tri(
        &mut self,
        tri: TriIdx,
    ) -> Option<(TriIdx, [VertexId; 2], usize)> {
        let mut best: Option<(TriIdx, usize)> = None;

        for slot in 0..3 {
            let neighbour = self.tri(tri).neighbours[slot];

            if neighbour == ABSENT || self.tri(neighbour).is_stripped() {
                continue;
            }

            let better = match best {
                None => true,
                Some((best_neighbour, _)) => {
                    self.tri(neighbour).unstripped_neighbours
                        < self.tri(best_neighbour).unstripped_neighbours
                }
            };

            if better {
                best = Some((neighbour, slot));
            }
        }

        let (neighbour, slot) = best?;
        let shared_edge = [
            self.tri(tri).vertices[slot],
            self.tri(tri).vertices[(slot + 1) % 3],
        ];

        self.set_stripped_and_propagate(neighbour);

        Some((neighbour, shared_edge, slot))
    }

    /// The best unstripped growth candidate of `tri`, excluding the back
    /// slot. A lower unstripped-neighbour count wins; ties prefer the near
    /// candidate, which saves a swap. Returns the slot and whether it is
    /// near, i.e. its shared edge contains `entrance`.
    pub(crate) fn best_growth_candidate(
        &self,
        tri: TriIdx,
        slot_to_prev: usize,
        entrance: VertexId,
    ) -> Option<(usize, bool)> {
        let mut best: Option<(usize, u8, bool)> = None;

        for i in 0..2 {
            let slot = remaining_slot(slot_to_prev, i);
            let neighbour = self.tri(tri).neighbours[slot];

            if neighbour == ABSENT || self.tri(neighbour).is_stripped() {
                continue;
            }

            let count = self.tri(neighbour).unstripped_neighbours;

            if let Some((_, best_count, best_near)) = best {
                if best_count < count {
                    break;
                }
                if best_count == count && best_near {
                    break;
                }
            }

            let near = self.tri(tri).vertices[slot] == entrance
                || self.tri(tri).vertices[(slot + 1) % 3] == entrance;

            best = Some((slot, count, near));
        }

        best.map(|(slot, _, near)| (slot, near))
    }

    pub(crate) fn endpoint_prepend(&mut self, idx: TriIdx) {
        self.endpoint_head = list_prepend(&mut self.tris, self.endpoint_head, idx);
    }

    pub(crate) fn endpoint_remove(&mut self, idx: TriIdx) {
        self.endpoint_head = list_remove(&mut self.tris, self.endpoint_head, idx);
    }

    /// Advance along the strip's strong edges, away from the back slot.
    /// Returns `false` without moving when `tri` is an endpoint.
    pub(crate) fn traverse_strip(&self, tri: &mut TriIdx, slot_to_prev: &mut usize) -> bool {
        let curr = *tri;

        if self.tri(curr).is_endpoint() {
            return false;
        }

        for i in 0..2 {
            let slot = remaining_slot(*slot_to_prev, i);

            if !self.tri(curr).is_linked(slot) {
                continue;
            }

            *tri = self.tri(curr).neighbours[slot];
            *slot_to_prev = self.tri(curr).back_slots[slot] as usize;

            return true;
        }

        panic!("Stranded at a non-endpoint triangle without linked neighbours!");
    }

    fn bucket_prepend(&mut self, idx: TriIdx) {
        let bucket = self.tris[idx as usize].unstripped_neighbours as usize;
        self.bucket_heads[bucket] = list_prepend(&mut self.tris, self.bucket_heads[bucket], idx);
    }

    fn bucket_remove(&mut self, idx: TriIdx) {
        let bucket = self.tris[idx as usize].unstripped_neighbours as usize;
        self.bucket_heads[bucket] = list_remove(&mut self.tris, self.bucket_heads[bucket], idx);
    }
}

/// Derive the entrance vertices of the three core triangles from the two
/// shared edges: the vertex common to both edges enters the middle triangle,
/// each edge's other vertex enters the outer triangle on its side.
pub(crate) fn core_entrance_vertices(
    first_edge: [VertexId; 2],
    second_edge: [VertexId; 2],
) -> [VertexId; 3] {
    if first_edge[0] == second_edge[0] {
        [first_edge[1], first_edge[0], second_edge[1]]
    } else if first_edge[0] == second_edge[1] {
        [first_edge[1], first_edge[0], second_edge[0]]
    } else if first_edge[1] == second_edge[0] {
        [first_edge[0], first_edge[1], second_edge[1]]
    } else {
        debug_assert_eq!(first_edge[1], second_edge[1]);
        [first_edge[0], first_edge[1], second_edge[0]]
    }
}

fn list_prepend(tris: &mut [Tri], head: TriIdx, idx: TriIdx) -> TriIdx {
    tris[idx as usize].prev = ABSENT;
    tris[idx as usize].next = head;

    if head != ABSENT {
        tris[head as usize].prev = idx;
    }

    idx
}

fn list_remove(tris: &mut [Tri], head: TriIdx, idx: TriIdx) -> TriIdx {
    let prev = tris[idx as usize].prev;
    let next = tris[idx as usize].next;

    if next != ABSENT {
        tris[next as usize].prev = prev;
    }

    if prev != ABSENT {
        tris[prev as usize].next = next;
        head
    } else {
        // The triangle was the list head.
        next
    }
}

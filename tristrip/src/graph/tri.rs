use bitflags::bitflags;

use super::{TriIdx, ABSENT};
use crate::VertexId;

bitflags! {
    /// Per-triangle state flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct TriFlags: u8 {
        /// The triangle has been absorbed into some strip.
        const STRIPPED = 1;
        /// The triangle currently ends a strip.
        const ENDPOINT = 1 << 1;
        /// The triangle sits on the active tunnel stack.
        const VISITED = 1 << 2;
    }
}

/// Tunnel-state value meaning "no candidate successors left".
const TUNNEL_STATE_DEPLETED: u8 = 3;

/// A triangle record of the adjacency graph.
///
/// Edge slot `i` is the edge between `vertices[i]` and `vertices[(i + 1) % 3]`:
///
/// ```text
///        0
///       / \
///    0 /   \ 2
///     /     \
///    1 ----- 2
///        1
/// ```
#[derive(Debug, Clone)]
pub(crate) struct Tri {
    /// The vertex ids in input winding order.
    pub(crate) vertices: [VertexId; 3],
    /// Neighbour triangle per edge slot, or [`ABSENT`].
    pub(crate) neighbours: [TriIdx; 3],
    /// Entry `i` is our slot index as stored in `neighbours[i]`.
    ///
    /// Stays 0 forever when the corresponding neighbour is absent.
    pub(crate) back_slots: [u8; 3],
    /// Intrusive list links. The same pair serves the adjacency buckets while
    /// strips are grown and the endpoint list while tunneling and collecting;
    /// the two phases never overlap on a triangle.
    pub(crate) prev: TriIdx,
    pub(crate) next: TriIdx,
    /// Position on the tunnel stack; only meaningful while `VISITED` is set.
    pub(crate) tunnel_index: u16,
    flags: TriFlags,
    /// Strong-edge bitmap in the low three bits, a one-deep shadow copy for
    /// tunnel rollback in the next three.
    link_state: u8,
    /// Packed stack of up to three 2-bit candidate slots with the sentinel on
    /// top; the low two bits are the current candidate.
    tunnel_state: u8,
    /// Neighbours not yet absorbed into any strip.
    pub(crate) unstripped_neighbours: u8,
}

impl Tri {
    pub(crate) const fn new(vertices: [VertexId; 3]) -> Self {
        Self {
            vertices,
            neighbours: [ABSENT; 3],
            back_slots: [0; 3],
            prev: ABSENT,
            next: ABSENT,
            tunnel_index: 0,
            flags: TriFlags::empty(),
            link_state: 0,
            tunnel_state: TUNNEL_STATE_DEPLETED,
            unstripped_neighbours: 0,
        }
    }

    pub(crate) const fn is_stripped(&self) -> bool {
        self.flags.contains(TriFlags::STRIPPED)
    }

    pub(crate) fn set_stripped(&mut self) {
        self.flags.insert(TriFlags::STRIPPED);
    }

    pub(crate) const fn is_endpoint(&self) -> bool {
        self.flags.contains(TriFlags::ENDPOINT)
    }

    pub(crate) fn set_endpoint(&mut self) {
        self.flags.insert(TriFlags::ENDPOINT);
    }

    pub(crate) fn set_non_endpoint(&mut self) {
        self.flags.remove(TriFlags::ENDPOINT);
    }

    pub(crate) const fn is_visited(&self) -> bool {
        self.flags.contains(TriFlags::VISITED)
    }

    pub(crate) fn set_visited(&mut self, tunnel_index: usize) {
        debug_assert!(tunnel_index <= u16::MAX as usize);

        self.flags.insert(TriFlags::VISITED);
        self.tunnel_index = tunnel_index as u16;
    }

    pub(crate) fn set_unvisited(&mut self) {
        self.flags.remove(TriFlags::VISITED);
    }

    /// Check if the edge at `slot` is strong, i.e. internal to a strip.
    pub(crate) const fn is_linked(&self, slot: usize) -> bool {
        debug_assert!(slot < 3);
        (self.link_state & (1 << slot)) != 0
    }

    /// An isolated endpoint has no strong edges at all. It forms a strip of
    /// its own and stays an endpoint even after being tunneled once.
    pub(crate) const fn is_isolated(&self) -> bool {
        debug_assert!(self.is_endpoint());
        (self.link_state & 7) == 0
    }

    pub(crate) fn link(&mut self, slot: usize) {
        debug_assert!(slot < 3);
        self.link_state |= 1 << slot;
    }

    pub(crate) fn unlink(&mut self, slot: usize) {
        debug_assert!(slot < 3);
        self.link_state &= !(1 << slot);
    }

    /// Copy the strong-edge bits into the shadow area.
    pub(crate) fn save_link_state(&mut self) {
        self.link_state = (self.link_state << 3) | (self.link_state & 7);
    }

    /// Bring the shadowed strong-edge bits back.
    pub(crate) fn restore_link_state(&mut self) {
        self.link_state >>= 3;
    }

    pub(crate) fn init_tunnel_state(&mut self) {
        self.tunnel_state = TUNNEL_STATE_DEPLETED;
    }

    pub(crate) const fn is_tunnel_state_depleted(&self) -> bool {
        self.tunnel_state == TUNNEL_STATE_DEPLETED
    }

    pub(crate) fn push_tunnel_state(&mut self, slot: usize) {
        debug_assert!(slot < 3);
        self.tunnel_state = (self.tunnel_state << 2) | (slot as u8);
    }

    /// Pop the current candidate. Returns `false` when the stack runs dry.
    pub(crate) fn select_next_tunnel_state(&mut self) -> bool {
        self.tunnel_state >>= 2;
        !self.is_tunnel_state_depleted()
    }

    /// The currently selected successor slot.
    pub(crate) const fn tunnel_successor_slot(&self) -> usize {
        (self.tunnel_state & 3) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let mut tri = Tri::new([0, 1, 2]);

        assert!(!tri.is_stripped());
        assert!(!tri.is_endpoint());
        assert!(!tri.is_visited());

        tri.set_stripped();
        tri.set_endpoint();
        tri.set_visited(7);
        assert!(tri.is_stripped());
        assert!(tri.is_endpoint());
        assert!(tri.is_visited());
        assert_eq!(tri.tunnel_index, 7);

        tri.set_unvisited();
        tri.set_non_endpoint();
        assert!(tri.is_stripped());
        assert!(!tri.is_endpoint());
        assert!(!tri.is_visited());
    }

    #[test]
    fn test_link_state_save_restore() {
        let mut tri = Tri::new([0, 1, 2]);

        tri.link(0);
        tri.link(2);
        assert!(tri.is_linked(0));
        assert!(!tri.is_linked(1));
        assert!(tri.is_linked(2));

        tri.save_link_state();
        tri.unlink(0);
        tri.link(1);
        assert!(!tri.is_linked(0));

        tri.restore_link_state();
        assert!(tri.is_linked(0));
        assert!(!tri.is_linked(1));
        assert!(tri.is_linked(2));
    }

    #[test]
    fn test_tunnel_state_stack() {
        let mut tri = Tri::new([0, 1, 2]);

        tri.init_tunnel_state();
        assert!(tri.is_tunnel_state_depleted());

        tri.push_tunnel_state(0);
        tri.push_tunnel_state(1);
        tri.push_tunnel_state(2);

        // The stack pops in reverse push order.
        assert_eq!(tri.tunnel_successor_slot(), 2);
        assert!(tri.select_next_tunnel_state());
        assert_eq!(tri.tunnel_successor_slot(), 1);
        assert!(tri.select_next_tunnel_state());
        assert_eq!(tri.tunnel_successor_slot(), 0);
        assert!(!tri.select_next_tunnel_state());
        assert!(tri.is_tunnel_state_depleted());
    }
}

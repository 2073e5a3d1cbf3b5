/// Largest admissible tunnel length; tunnel positions are tracked in 16 bits.
pub const MAX_TUNNEL_COUNT: usize = u16::MAX as usize;

/// The algorithm that lays down the initial strips before tunneling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreprocAlgorithm {
    /// Treat every triangle as a strip of its own.
    Isolated,
    /// Greedily pair each triangle with one neighbour.
    Pairs,
    /// Full greedy strip growth, identical to the non-tunneled algorithm.
    #[default]
    Stripify,
}

/// Parameters for [`create_strips`](crate::create_strips).
///
/// Everything below `preserve_orientation` only matters when tunneling is
/// enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Run the tunneling passes after preprocessing, or fall back to
    /// stripify-only.
    pub use_tunneling: bool,
    /// Keep the face orientation of every emitted triangle, at the price of
    /// at most one extra leading vertex per strip.
    pub preserve_orientation: bool,
    /// How the initial strips are laid down before tunneling.
    pub preproc_algorithm: PreprocAlgorithm,
    /// The maximum number of triangles that form a tunnel. Rectified before
    /// use: clamped to the triangle count and [`MAX_TUNNEL_COUNT`], then
    /// rounded down to an even value of at least 2.
    pub max_count: usize,
    /// Search tunnels of length 2 first, then 4, and so on up to
    /// `max_count`, instead of going for the full depth immediately.
    pub incremental: bool,
    /// Cap on the search iterations per tunnel; `None` searches exhaustively.
    pub loop_limit: Option<usize>,
    /// What to do when `loop_limit` is hit: abandon the tunnel (`false`), or
    /// backtrack to the start and search on with a fresh budget (`true`).
    pub backtrack_after_loop_limit: bool,
    /// Stop tunneling once the strip count has dropped to this value.
    pub dest_count: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            use_tunneling: false,
            preserve_orientation: false,
            preproc_algorithm: PreprocAlgorithm::default(),
            max_count: MAX_TUNNEL_COUNT,
            incremental: false,
            loop_limit: None,
            backtrack_after_loop_limit: false,
            dest_count: None,
        }
    }
}

impl Config {
    /// Enable tunneling with the given preprocessing algorithm.
    pub fn with_tunneling(mut self, preproc_algorithm: PreprocAlgorithm) -> Self {
        self.use_tunneling = true;
        self.preproc_algorithm = preproc_algorithm;
        self
    }

    /// Preserve the face orientation of every emitted triangle.
    pub fn with_preserve_orientation(mut self) -> Self {
        self.preserve_orientation = true;
        self
    }

    /// Bound the tunnel length.
    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = max_count;
        self
    }

    /// Deepen the tunnel search incrementally.
    pub fn with_incremental(mut self) -> Self {
        self.incremental = true;
        self
    }

    /// Cap the search iterations per tunnel.
    pub fn with_loop_limit(mut self, loop_limit: usize, backtrack_after_loop_limit: bool) -> Self {
        self.loop_limit = Some(loop_limit);
        self.backtrack_after_loop_limit = backtrack_after_loop_limit;
        self
    }

    /// Stop tunneling at the given strip count.
    pub fn with_dest_count(mut self, dest_count: usize) -> Self {
        self.dest_count = Some(dest_count);
        self
    }

    /// Clamp `max_count` to the triangle count and the 16-bit position
    /// limit, then round it down to the nearest even value of at least 2.
    /// Odd values are pointless because every tunnel has an even length.
    pub(crate) fn rectified(&self, tris_count: usize) -> Self {
        let clamped = self.max_count.min(tris_count).min(MAX_TUNNEL_COUNT);

        Self {
            max_count: ((clamped / 2) * 2).max(2),
            ..*self
        }
    }
}

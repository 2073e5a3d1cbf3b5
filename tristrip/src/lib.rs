//! # tristrip
//!
//! Convert indexed triangle meshes into triangle strips via greedy
//! stripification and optional tunneling.
#![forbid(unsafe_code)]
#![deny(unused)]
#![warn(clippy::all, clippy::missing_const_for_fn)]

pub use config::{Config, PreprocAlgorithm, MAX_TUNNEL_COUNT};
pub use stats::Stats;
pub use strip::{is_degenerate, Strip};
pub use verifier::Verifier;

mod collect;
pub mod config;
mod graph;
mod preprocess;
pub mod stats;
pub mod strip;
mod stripify;
mod tunnel;
pub mod verifier;

use anyhow::{Ok as HowOk, Result as HowResult};

use graph::TriGraph;

/// The id type for vertices: an opaque 32-bit identity.
pub type VertexId = u32;

/// Convert a flat id array (three ids per triangle) into triangle strips.
///
/// Degenerate input triangles are dropped. With `use_tunneling` disabled the
/// greedy stripify algorithm runs on its own; enabled, the configured
/// preprocessing algorithm lays down initial strips and tunneling merges
/// them pairwise before the surviving strips are collected.
///
/// Fewer than three ids yield no strips; otherwise the id count must be
/// divisible by 3.
///
/// ## Example
/// ```
/// use tristrip::{create_strips, Config};
///
/// let ids = [0, 1, 2, 2, 1, 3];
/// let strips = create_strips(&ids, &Config::default()).unwrap();
///
/// assert_eq!(strips.len(), 1);
/// assert_eq!(strips[0].ids, vec![3, 2, 1, 0]);
/// ```
pub fn create_strips(ids: &[VertexId], config: &Config) -> HowResult<Vec<Strip>> {
    if ids.len() < 3 {
        return HowOk(Vec::new());
    }

    if ids.len() % 3 != 0 {
        return Err(anyhow::Error::msg(
            "Number of vertex ids must be divisible by 3!",
        ));
    }

    let mut graph = TriGraph::from_ids(ids);

    // All input triangles might have been degenerate.
    if graph.is_empty() {
        return HowOk(Vec::new());
    }

    let strips = if config.use_tunneling {
        let config = config.rectified(graph.len());
        tunnel::create_strips(&mut graph, &config)
    } else {
        stripify::create_strips(&mut graph, config.preserve_orientation)
    };

    HowOk(strips)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tristrip_test_utils::{fan_ids, grid_ids, soup_ids};

    use super::*;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Rotate a triangle so that its smallest id leads; cyclic rotations
    /// describe the same winding.
    fn rotate_min_first(tri: [VertexId; 3]) -> [VertexId; 3] {
        let min_pos = (0..3).min_by_key(|&i| tri[i]).unwrap();
        [
            tri[min_pos],
            tri[(min_pos + 1) % 3],
            tri[(min_pos + 2) % 3],
        ]
    }

    /// Assert that every non-degenerate strip triangle matches an input
    /// triangle's winding, under the parity rule of strips: even-index
    /// triangles keep their order, odd-index triangles present their first
    /// two vertices swapped.
    fn assert_orientation_preserved(ids: &[VertexId], strips: &[Strip]) {
        let mut input: HashMap<[VertexId; 3], usize> = HashMap::new();

        for chunk in ids.chunks_exact(3) {
            let tri = [chunk[0], chunk[1], chunk[2]];

            if is_degenerate(&tri) {
                continue;
            }

            *input.entry(rotate_min_first(tri)).or_insert(0) += 1;
        }

        for strip in strips {
            for (k, tri) in strip.triangles().enumerate() {
                if is_degenerate(&tri) {
                    continue;
                }

                let presented = if k % 2 == 0 {
                    tri
                } else {
                    [tri[1], tri[0], tri[2]]
                };

                let count = input
                    .get_mut(&rotate_min_first(presented))
                    .unwrap_or_else(|| panic!("winding of {presented:?} not in the input"));

                assert!(*count > 0, "winding of {presented:?} over-represented");
                *count -= 1;
            }
        }
    }

    fn assert_valid_cover(ids: &[VertexId], strips: &[Strip]) {
        for strip in strips {
            assert!(strip.ids.len() >= 3);

            // A degenerate output triangle is a swap or an orientation pad:
            // it repeats one id, never all three.
            for tri in strip.triangles() {
                if is_degenerate(&tri) {
                    assert!(tri[0] != tri[1] || tri[1] != tri[2]);
                }
            }
        }

        assert!(Verifier::new(ids).verify(strips));
    }

    #[test]
    fn test_trivial_inputs_yield_no_strips() {
        let config = Config::default();

        assert!(create_strips(&[], &config).unwrap().is_empty());
        assert!(create_strips(&[0], &config).unwrap().is_empty());
        assert!(create_strips(&[0, 1], &config).unwrap().is_empty());
    }

    #[test]
    fn test_indivisible_id_count_is_rejected() {
        let result = create_strips(&[0, 1, 2, 3], &Config::default());

        assert!(result.is_err());
    }

    #[test]
    fn test_all_degenerate_input_yields_no_strips() {
        let strips = create_strips(&[0, 0, 1, 2, 2, 2], &Config::default()).unwrap();

        assert!(strips.is_empty());
    }

    #[test]
    fn test_single_triangle() {
        let ids = [0, 1, 2];
        let strips = create_strips(&ids, &Config::default()).unwrap();

        assert_eq!(strips.len(), 1);
        assert_eq!(strips[0].ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_two_triangle_fan() {
        let ids = [0, 1, 2, 3, 1, 2];
        let strips = create_strips(&ids, &Config::default()).unwrap();

        assert_eq!(strips.len(), 1);
        assert_eq!(strips[0].ids.len(), 4);
        assert_valid_cover(&ids, &strips);
    }

    #[test]
    fn test_three_triangle_strip_without_tunneling() {
        let ids = [0, 1, 2, 3, 1, 2, 4, 2, 3];
        let strips = create_strips(&ids, &Config::default()).unwrap();

        assert_eq!(strips.len(), 1);
        assert_eq!(strips[0].ids.len(), 5);
        assert_valid_cover(&ids, &strips);
    }

    #[test]
    fn test_disconnected_triangle_pair() {
        let ids = [0, 1, 2, 3, 4, 5];
        let strips = create_strips(&ids, &Config::default()).unwrap();

        assert_eq!(strips.len(), 2);
        assert_eq!(strips[0].ids.len(), 3);
        assert_eq!(strips[1].ids.len(), 3);
        assert_valid_cover(&ids, &strips);
    }

    #[test]
    fn test_degenerate_triangle_is_dropped() {
        let ids = [0, 0, 1, 2, 3, 4];
        let strips = create_strips(&ids, &Config::default()).unwrap();

        assert_eq!(strips.len(), 1);
        assert_eq!(strips[0].ids, vec![2, 3, 4]);
    }

    #[test]
    fn test_non_manifold_four_fold_edge() {
        let ids = [0, 1, 2, 3, 1, 2, 4, 1, 2, 5, 1, 2];

        for config in [
            Config::default(),
            Config::default().with_tunneling(PreprocAlgorithm::Stripify),
        ] {
            let strips = create_strips(&ids, &config).unwrap();

            assert!(strips.len() <= 2);
            assert_valid_cover(&ids, &strips);
        }
    }

    #[test]
    fn test_grid_cover_stripify_only() {
        init_logging();

        let ids = grid_ids(6, 5);
        let strips = create_strips(&ids, &Config::default()).unwrap();

        assert_valid_cover(&ids, &strips);
    }

    #[test]
    fn test_grid_cover_with_tunneling() {
        init_logging();

        let ids = grid_ids(5, 4);

        for preproc in [
            PreprocAlgorithm::Isolated,
            PreprocAlgorithm::Pairs,
            PreprocAlgorithm::Stripify,
        ] {
            let config = Config::default().with_tunneling(preproc);
            let strips = create_strips(&ids, &config).unwrap();

            assert_valid_cover(&ids, &strips);
        }
    }

    #[test]
    fn test_fan_cover() {
        let ids = fan_ids(8);

        for config in [
            Config::default(),
            Config::default().with_tunneling(PreprocAlgorithm::Isolated),
        ] {
            let strips = create_strips(&ids, &config).unwrap();

            assert_valid_cover(&ids, &strips);
        }
    }

    #[test]
    fn test_orientation_preserved_on_grid_stripify_only() {
        let ids = grid_ids(6, 5);
        let config = Config::default().with_preserve_orientation();

        let strips = create_strips(&ids, &config).unwrap();

        assert_valid_cover(&ids, &strips);
        assert_orientation_preserved(&ids, &strips);
    }

    #[test]
    fn test_orientation_preserved_on_grid_with_tunneling() {
        let ids = grid_ids(5, 4);

        for preproc in [
            PreprocAlgorithm::Isolated,
            PreprocAlgorithm::Pairs,
            PreprocAlgorithm::Stripify,
        ] {
            let config = Config::default()
                .with_tunneling(preproc)
                .with_preserve_orientation();

            let strips = create_strips(&ids, &config).unwrap();

            assert_valid_cover(&ids, &strips);
            assert_orientation_preserved(&ids, &strips);
        }
    }

    #[test]
    fn test_orientation_preserved_on_fan() {
        let ids = fan_ids(7);
        let config = Config::default().with_preserve_orientation();

        let strips = create_strips(&ids, &config).unwrap();

        assert_valid_cover(&ids, &strips);
        assert_orientation_preserved(&ids, &strips);
    }

    #[test]
    fn test_deterministic_output() {
        let ids = grid_ids(5, 4);

        for config in [
            Config::default(),
            Config::default().with_tunneling(PreprocAlgorithm::Stripify),
        ] {
            let first = create_strips(&ids, &config).unwrap();
            let second = create_strips(&ids, &config).unwrap();

            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_random_soups_are_covered() {
        init_logging();

        // Random soups contain degenerate triangles, duplicates and
        // non-manifold edges; the cover property must hold regardless.
        for tris_count in [1, 5, 20, 40] {
            let ids = soup_ids(tris_count, 16);

            let configs = [
                Config::default(),
                Config::default().with_preserve_orientation(),
                Config::default()
                    .with_tunneling(PreprocAlgorithm::Isolated)
                    .with_max_count(8),
                Config::default()
                    .with_tunneling(PreprocAlgorithm::Pairs)
                    .with_max_count(8)
                    .with_incremental(),
                Config::default()
                    .with_tunneling(PreprocAlgorithm::Stripify)
                    .with_max_count(8)
                    .with_loop_limit(64, true),
            ];

            for config in configs {
                let strips = create_strips(&ids, &config).unwrap();

                assert_valid_cover(&ids, &strips);
            }
        }
    }

    #[test]
    fn test_stats_match_verified_cover() {
        let ids = grid_ids(4, 4);
        let strips = create_strips(&ids, &Config::default()).unwrap();

        let stats = Stats::measure(&strips);

        assert_eq!(stats.strips_count, strips.len());
        assert_eq!(stats.valid_tris_count, ids.len() / 3);
    }
}

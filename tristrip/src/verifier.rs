use fnv::FnvHashMap;
use log::warn;

use crate::strip::{is_degenerate, Strip};
use crate::VertexId;

/// Checks strip sets against the triangle multiset of an id list.
///
/// A correct strip set covers exactly the non-degenerate triangles of the
/// input, with the same multiplicities; triangles are compared as unordered
/// triples. Duplicated input triangles are handled.
pub struct Verifier {
    /// Expected multiplicity per distinct non-degenerate triangle.
    occurrences: FnvHashMap<[VertexId; 3], usize>,
    /// The total number of non-degenerate input triangles.
    valid_tris_count: usize,
}

/// The three vertex ids in ascending order identify a triangle regardless of
/// winding.
fn tri_key(tri: [VertexId; 3]) -> [VertexId; 3] {
    let mut key = tri;
    key.sort_unstable();
    key
}

impl Verifier {
    /// Record the triangle multiset of `ids`. Degenerate triangles are
    /// ignored, exactly as the stripper ignores them.
    ///
    /// Panics if `ids.len()` is not divisible by 3.
    pub fn new(ids: &[VertexId]) -> Self {
        assert!(
            ids.len() % 3 == 0,
            "Number of vertex ids must be divisible by 3!"
        );

        let mut occurrences = FnvHashMap::default();
        let mut valid_tris_count = 0;

        for chunk in ids.chunks_exact(3) {
            let tri = [chunk[0], chunk[1], chunk[2]];

            if is_degenerate(&tri) {
                continue;
            }

            *occurrences.entry(tri_key(tri)).or_insert(0) += 1;
            valid_tris_count += 1;
        }

        Self {
            occurrences,
            valid_tris_count,
        }
    }

    /// Check that `strips` cover exactly the recorded triangle multiset.
    /// Every discrepancy is logged at warn level.
    pub fn verify(&self, strips: &[Strip]) -> bool {
        let mut found: FnvHashMap<[VertexId; 3], usize> = FnvHashMap::default();
        let mut valid_tris_count = 0;
        let mut sound = true;

        for strip in strips {
            for tri in strip.triangles() {
                if is_degenerate(&tri) {
                    continue;
                }

                let key = tri_key(tri);

                let Some(&expected) = self.occurrences.get(&key) else {
                    warn!("unknown triangle: {key:?} is in a strip but not in the triangle list");
                    sound = false;

                    continue;
                };

                let count = found.entry(key).or_insert(0);
                *count += 1;

                if *count > expected {
                    warn!(
                        "superfluous triangle: {key:?} appears {count} times in the strips \
                         but only {expected} time(s) in the triangle list"
                    );
                    sound = false;

                    continue;
                }

                valid_tris_count += 1;
            }
        }

        // No overflows; but maybe triangles went missing?
        if valid_tris_count < self.valid_tris_count {
            for (key, &expected) in &self.occurrences {
                let got = found.get(key).copied().unwrap_or(0);

                if got < expected {
                    warn!(
                        "missing triangle: {key:?} should appear {expected} time(s) \
                         but was encountered {got} time(s)"
                    );
                }
            }

            sound = false;
        }

        sound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_exact_cover() {
        let verifier = Verifier::new(&[0, 1, 2, 3, 1, 2, 4, 2, 3]);

        let strips = vec![Strip {
            ids: vec![4, 3, 2, 1, 0],
        }];

        assert!(verifier.verify(&strips));
    }

    #[test]
    fn test_accepts_cover_with_swaps() {
        let verifier = Verifier::new(&[0, 1, 2, 3, 1, 2, 4, 2, 3]);

        let strips = vec![Strip {
            ids: vec![4, 4, 3, 2, 1, 0],
        }];

        assert!(verifier.verify(&strips));
    }

    #[test]
    fn test_rejects_missing_triangle() {
        let verifier = Verifier::new(&[0, 1, 2, 3, 1, 2]);

        let strips = vec![Strip {
            ids: vec![0, 1, 2],
        }];

        assert!(!verifier.verify(&strips));
    }

    #[test]
    fn test_rejects_unknown_triangle() {
        let verifier = Verifier::new(&[0, 1, 2]);

        let strips = vec![Strip {
            ids: vec![0, 1, 2, 5],
        }];

        assert!(!verifier.verify(&strips));
    }

    #[test]
    fn test_rejects_superfluous_triangle() {
        let verifier = Verifier::new(&[0, 1, 2]);

        let strips = vec![
            Strip {
                ids: vec![0, 1, 2],
            },
            Strip {
                ids: vec![2, 1, 0],
            },
        ];

        assert!(!verifier.verify(&strips));
    }

    #[test]
    fn test_handles_duplicated_input_triangles() {
        let verifier = Verifier::new(&[0, 1, 2, 2, 1, 0]);

        let strips = vec![
            Strip {
                ids: vec![0, 1, 2],
            },
            Strip {
                ids: vec![2, 1, 0],
            },
        ];

        assert!(verifier.verify(&strips));

        let short = vec![Strip {
            ids: vec![0, 1, 2],
        }];

        assert!(!verifier.verify(&short));
    }

    #[test]
    fn test_ignores_degenerate_input() {
        let verifier = Verifier::new(&[0, 0, 1, 2, 3, 4]);

        let strips = vec![Strip {
            ids: vec![2, 3, 4],
        }];

        assert!(verifier.verify(&strips));
    }
}

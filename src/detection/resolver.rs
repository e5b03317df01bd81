//! Decode accumulated observations and aggregate them into the final
//! correspondence map.

use serde::{Deserialize, Serialize};

use crate::codec::{BalancedCode, SampleGrid};

use super::accumulator::ObservationAccumulator;

/// One resolved sample point: the representative camera pixel (median of
/// all observing pixels, possibly fractional) and the projector sample
/// coordinate in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrespondenceRecord {
    pub camera_x: f32,
    pub camera_y: f32,
    pub projector_i: u32,
    pub projector_j: u32,
}

/// Decode and aggregation counters. Discards are expected steady-state
/// noise, reported for observability only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveStats {
    /// Camera pixels whose word decoded to an in-range sample point.
    pub accepted: usize,
    /// Camera pixels dropped on a decode miss or an out-of-grid index.
    pub discarded: usize,
}

/// Final correspondence output of one acquisition run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrespondenceMap {
    /// Records in sample-index order.
    pub records: Vec<CorrespondenceRecord>,
    pub stats: ResolveStats,
}

impl CorrespondenceMap {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fold another run's result in (multi-region or multi-pose
    /// acquisition): records concatenate, counters add.
    pub fn merge(&mut self, other: CorrespondenceMap) {
        self.records.extend(other.records);
        self.stats.accepted += other.stats.accepted;
        self.stats.discarded += other.stats.discarded;
    }
}

/// Turns per-pixel observations into per-sample-point records.
pub struct CorrespondenceResolver<'a> {
    grid: &'a SampleGrid,
    code: &'a BalancedCode,
    origin: (u32, u32),
}

impl<'a> CorrespondenceResolver<'a> {
    /// `origin` is the probed region's offset inside the projector image;
    /// it is added to every resolved projector coordinate.
    pub fn new(grid: &'a SampleGrid, code: &'a BalancedCode, origin: (u32, u32)) -> Self {
        Self { grid, code, origin }
    }

    /// Decode every observed pixel, guard the sample-index range, and
    /// aggregate multiple observers of one sample point by element-wise
    /// median, which keeps isolated misclassified pixels at decode
    /// boundaries from skewing the result.
    pub fn resolve(&self, accumulator: &ObservationAccumulator) -> CorrespondenceMap {
        let mut candidates: Vec<Vec<(u32, u32)>> = vec![Vec::new(); self.grid.len()];
        let mut stats = ResolveStats::default();

        for ((x, y), word) in accumulator.observed() {
            match self.code.decode(word) {
                // The code may hold more words than the grid has sample
                // points; an index past the grid cannot come from a real
                // pattern.
                Some(index) if index < self.grid.len() => {
                    candidates[index].push((x, y));
                    stats.accepted += 1;
                }
                _ => stats.discarded += 1,
            }
        }

        let mut records = Vec::new();
        for (index, observers) in candidates.iter().enumerate() {
            if observers.is_empty() {
                continue;
            }
            let (i, j) = self.grid.unravel(index);
            let mut xs: Vec<u32> = observers.iter().map(|&(x, _)| x).collect();
            let mut ys: Vec<u32> = observers.iter().map(|&(_, y)| y).collect();
            records.push(CorrespondenceRecord {
                camera_x: median(&mut xs),
                camera_y: median(&mut ys),
                projector_i: i + self.origin.0,
                projector_j: j + self.origin.1,
            });
        }

        log::info!(
            "Resolved {} sample points from {} accepted pixels, discarded {}",
            records.len(),
            stats.accepted,
            stats.discarded
        );

        CorrespondenceMap { records, stats }
    }
}

/// Median with even-count averaging of the two middles.
fn median(values: &mut [u32]) -> f32 {
    debug_assert!(!values.is_empty());
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid] as f32
    } else {
        (values[mid - 1] as f32 + values[mid] as f32) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Codeword;

    fn light(acc: &mut ObservationAccumulator, x: u32, y: u32, word: Codeword) {
        for bit in word.bits() {
            acc.record(x, y, bit);
        }
    }

    #[test]
    fn median_picks_the_middle_observer() {
        let grid = SampleGrid::new(20, 20, 5);
        let code = BalancedCode::with_capacity(grid.len()).unwrap();
        let word = code.encode(grid.ravel(5, 5).unwrap()).unwrap();

        let mut acc = ObservationAccumulator::new(200, 200);
        for &(x, y) in &[(10, 10), (12, 10), (100, 100)] {
            light(&mut acc, x, y, word);
        }

        let map = CorrespondenceResolver::new(&grid, &code, (0, 0)).resolve(&acc);
        assert_eq!(map.len(), 1);
        let record = map.records[0];
        assert_eq!((record.camera_x, record.camera_y), (12.0, 10.0));
        assert_eq!((record.projector_i, record.projector_j), (5, 5));
        assert_eq!(map.stats.accepted, 3);
        assert_eq!(map.stats.discarded, 0);
    }

    #[test]
    fn even_observer_count_averages_the_middles() {
        let grid = SampleGrid::new(10, 10, 5);
        let code = BalancedCode::with_capacity(grid.len()).unwrap();
        let word = code.encode(0).unwrap();

        let mut acc = ObservationAccumulator::new(50, 50);
        light(&mut acc, 10, 10, word);
        light(&mut acc, 13, 11, word);

        let map = CorrespondenceResolver::new(&grid, &code, (0, 0)).resolve(&acc);
        assert_eq!(map.len(), 1);
        assert_eq!(map.records[0].camera_x, 11.5);
        assert_eq!(map.records[0].camera_y, 10.5);
    }

    #[test]
    fn unknown_words_and_overshoot_indices_are_discarded() {
        // 16 sample points labeled out of a 20-word code
        let grid = SampleGrid::new(40, 40, 10);
        let code = BalancedCode::with_capacity(grid.len()).unwrap();

        let mut acc = ObservationAccumulator::new(50, 50);
        // valid word with no sample point behind it
        light(&mut acc, 3, 3, code.encode(17).unwrap());
        // lone bit, not a word of the code
        acc.record(7, 7, 0);

        let map = CorrespondenceResolver::new(&grid, &code, (0, 0)).resolve(&acc);
        assert!(map.is_empty());
        assert_eq!(map.stats.accepted, 0);
        assert_eq!(map.stats.discarded, 2);
    }

    #[test]
    fn region_origin_offsets_projector_coordinates() {
        let grid = SampleGrid::new(20, 20, 5);
        let code = BalancedCode::with_capacity(grid.len()).unwrap();
        let word = code.encode(grid.ravel(10, 5).unwrap()).unwrap();

        let mut acc = ObservationAccumulator::new(30, 30);
        light(&mut acc, 0, 0, word);

        let map = CorrespondenceResolver::new(&grid, &code, (100, 50)).resolve(&acc);
        assert_eq!(map.len(), 1);
        assert_eq!(map.records[0].projector_i, 110);
        assert_eq!(map.records[0].projector_j, 55);
    }

    #[test]
    fn merge_concatenates_records_and_adds_counters() {
        let mut left = CorrespondenceMap {
            records: vec![CorrespondenceRecord {
                camera_x: 1.0,
                camera_y: 2.0,
                projector_i: 10,
                projector_j: 20,
            }],
            stats: ResolveStats {
                accepted: 4,
                discarded: 1,
            },
        };
        let right = CorrespondenceMap {
            records: vec![CorrespondenceRecord {
                camera_x: 3.0,
                camera_y: 4.0,
                projector_i: 30,
                projector_j: 40,
            }],
            stats: ResolveStats {
                accepted: 2,
                discarded: 3,
            },
        };

        left.merge(right);
        assert_eq!(left.len(), 2);
        assert_eq!(left.stats.accepted, 6);
        assert_eq!(left.stats.discarded, 4);
    }
}

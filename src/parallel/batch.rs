//! Chunked parallel trial execution.
//!
//! A parallel batch is split into chunks; each chunk is simulated across the pool and then
//! handed back to the single writer before the next chunk starts, which bounds memory and
//! keeps writes serialized.

use std::ops::Range;

use rayon::prelude::*;

use crate::batch::{run_trial, trial_seed};
use crate::combat::{SimulationConfig, TrialResult};

/// Split `total` items into up to `num_batches` ranges `[start, end)`.
/// Batches are as equal in size as possible; later batches may be smaller.
///
/// # Example
/// ```
/// # use bfrpg_sim::parallel::batch_ranges;
/// let ranges = batch_ranges(100, 4);
/// assert_eq!(ranges, vec![(0, 25), (25, 50), (50, 75), (75, 100)]);
/// ```
pub fn batch_ranges(total: usize, num_batches: usize) -> Vec<(usize, usize)> {
    if total == 0 || num_batches == 0 {
        return Vec::new();
    }
    let num_batches = num_batches.min(total);
    let base = total / num_batches;
    let remainder = total % num_batches;
    let mut ranges = Vec::with_capacity(num_batches);
    let mut start = 0;
    for i in 0..num_batches {
        let size = base + if i < remainder { 1 } else { 0 };
        let end = start + size;
        ranges.push((start, end));
        start = end;
    }
    ranges
}

/// Simulate trials `range` in parallel on the current Rayon pool. Trial `i` is seeded with
/// `base_seed + i`, so the results match a sequential run and come back in trial order.
pub fn simulate_range(
    range: Range<usize>,
    base_seed: u64,
    config: &SimulationConfig,
) -> Vec<TrialResult> {
    range
        .into_par_iter()
        .map(|trial| run_trial(trial_seed(base_seed, trial), config))
        .collect()
}

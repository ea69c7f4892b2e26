//! Assorted utilities and helpers.

/// Sequences handed to each worker per parallel chunk.
pub const SEQUENCES_PER_WORKER: usize = 32;

/// Number of sequences to buffer between the parser and a parallel decode.
///
/// Large enough to keep every worker busy, small enough that a long batch
/// file is never held in memory all at once. `workers == 0` counts as one.
#[inline]
pub fn default_chunk_size(workers: usize) -> usize {
    workers.max(1).saturating_mul(SEQUENCES_PER_WORKER)
}

/// Worker count visible to the batch engine.
#[inline]
pub fn available_workers() -> usize {
    #[cfg(feature = "parallel")]
    {
        rayon::current_num_threads()
    }
    #[cfg(not(feature = "parallel"))]
    {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_workers_counts_as_one() {
        assert_eq!(default_chunk_size(0), SEQUENCES_PER_WORKER);
        assert_eq!(default_chunk_size(1), SEQUENCES_PER_WORKER);
    }

    #[test]
    fn scales_with_workers() {
        assert_eq!(default_chunk_size(8), 8 * SEQUENCES_PER_WORKER);
        assert_eq!(default_chunk_size(usize::MAX), usize::MAX);
    }

    #[test]
    fn monotonic_non_decreasing() {
        let mut prev = 0;
        for w in 0..256 {
            let c = default_chunk_size(w);
            assert!(c >= prev, "chunk size decreased at workers={w}: {c} < {prev}");
            prev = c;
        }
    }

    #[test]
    fn at_least_one_worker() {
        assert!(available_workers() >= 1);
    }
}

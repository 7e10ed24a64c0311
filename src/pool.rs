//! Thread pool used by the three bulk-synchronous parallel regions of the
//! exchange driver (corpus scan, per-word scoring pass, matrix rebuild).
//!
//! Every parallel region here is a fork-join with a barrier at the end, not
//! incremental job submission, so a single pool built once from
//! `--num-threads` and reused via [`rayon::ThreadPool::install`] is enough.

/// Build a `rayon::ThreadPool` sized from the resolved `--num-threads`
/// configuration value. Built once at startup and reused via
/// [`rayon::ThreadPool::install`] for every parallel region.
pub fn build_pool(num_threads: usize) -> rayon::ThreadPool {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .expect("thread pool construction with a validated thread count does not fail")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_runs_work_on_requested_thread_count() {
        let pool = build_pool(2);
        let sum: i32 = pool.install(|| (0..100).sum());
        assert_eq!(sum, 4950);
    }

    #[test]
    fn single_thread_pool_still_runs_parallel_iterators() {
        use rayon::prelude::*;
        let pool = build_pool(1);
        let sum: i32 = pool.install(|| (0..10).into_par_iter().sum());
        assert_eq!(sum, 45);
    }
}

/// Returns the number of logical CPU cores available on the system, used to
/// resolve `--num-threads 0` to "use every core".
///
/// Guaranteed to return a value ≥ 1 (falls back to 1 if the platform can't
/// report a count).
pub fn count_cores() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

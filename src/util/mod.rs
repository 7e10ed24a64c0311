//! Cross-cutting utility functions used by the CLI and clustering driver.
//!
//! Submodules:
//! - [`cores`] — CPU core counting via [`std::thread::available_parallelism`]
//!
//! The most commonly needed symbols are re-exported at the `util` module level.

pub mod cores;

pub use cores::count_cores;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_cores_at_least_one() {
        assert!(count_cores() >= 1);
    }
}

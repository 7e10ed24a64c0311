//! CLI-wide constants and the verbosity display level.
//!
//! `DISPLAY_LEVEL` is a signed atomic, not unsigned: the configuration
//! allows negative `--verbose` values to silence warnings entirely (see
//! [`crate::cli::args::Cli`]), which an unsigned counter cannot represent.

use std::sync::atomic::{AtomicI32, Ordering};

pub const PROGRAM_NAME: &str = "clustercat";
pub const AUTHOR: &str = "Jon Dehdari";

/// Default verbosity: warnings and above, no per-cycle progress detail.
pub const DEFAULT_DISPLAY_LEVEL: i32 = 1;

/// File-scoped verbosity level, read by every call to [`displaylevel!`].
/// 0 or negative silences warnings; higher values add progressively more
/// per-cycle detail.
pub static DISPLAY_LEVEL: AtomicI32 = AtomicI32::new(DEFAULT_DISPLAY_LEVEL);

#[inline]
pub fn display_level() -> i32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

#[inline]
pub fn set_display_level(level: i32) {
    DISPLAY_LEVEL.store(level, Ordering::Relaxed);
}

/// Conditionally print to stderr at or above `level`.
#[macro_export]
macro_rules! displaylevel {
    ($level:expr, $($arg:tt)*) => {
        if $crate::cli::constants::display_level() >= $level {
            eprintln!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_level_round_trips() {
        let prev = display_level();
        set_display_level(-1);
        assert_eq!(display_level(), -1);
        set_display_level(4);
        assert_eq!(display_level(), 4);
        set_display_level(prev);
    }

    #[test]
    fn default_level_shows_warnings_only() {
        assert_eq!(DEFAULT_DISPLAY_LEVEL, 1);
    }
}

//! Command-line surface: flag parsing ([`args`]) and shared verbosity state
//! ([`constants`]).

pub mod args;
pub mod constants;

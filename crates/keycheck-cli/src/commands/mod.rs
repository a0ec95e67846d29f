//! Command implementations

mod check;

pub use check::{CheckOptions, run_check};

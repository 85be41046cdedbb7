//! Shared test utilities for the Hi-C contact viewer workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Genome, ladder and file-stat fixtures matching the reference scenarios
//! - Synthetic contact-matrix and restriction-site generators
//! - Float assertion macros
//!
//! The fixtures are plain tuples and JSON values so that this crate does not
//! depend on the crates it helps test.
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, fixtures};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Assert that a list of `(x, y, value)` tuples contains an entry.
///
/// Works on anything that yields `(f64, f64, f64)`, e.g. the result of
/// mapping pixel cells through `PixelCell::xyv`.
///
/// ```ignore
/// let cells: Vec<(f64, f64, f64)> = batch.iter().map(|c| c.xyv()).collect();
/// assert_contains_cell!(cells, (0.0, 2.0, 9454.0));
/// ```
#[macro_export]
macro_rules! assert_contains_cell {
    ($cells:expr, ($x:expr, $y:expr, $v:expr)) => {{
        let wanted: (f64, f64, f64) = ($x as f64, $y as f64, $v as f64);
        if !$cells.iter().any(|c| *c == wanted) {
            panic!(
                "assertion failed: cell {:?} not found in {:?}",
                wanted, $cells
            );
        }
    }};
}

//! Triple → pixel-cell conversion.
//!
//! - [`grid`]: genome and chromosome-pair views, bin-aligned cells
//! - [`detail`]: base-pair and fragment detail views, range-relative cells

pub mod detail;
pub mod grid;

//! Common types and utilities shared across the Hi-C contact viewer crates.

pub mod catalog;
pub mod chromosome;
pub mod error;
pub mod ladder;
pub mod matrix;
pub mod range;
pub mod view;

pub use catalog::FileCatalog;
pub use chromosome::{ChromosomeIndex, ChromosomeRef, GenomeMetadata};
pub use error::{HicError, Result};
pub use ladder::ResolutionLadder;
pub use matrix::{BinUnit, ColorDomain, MatrixTriple, MatrixType, NormalizationMethod, PixelCell};
pub use range::GenomicRange;
pub use view::ViewState;

//! Resolution ladders exposed by a contact-matrix file.

use serde::{Deserialize, Serialize};

use crate::error::{HicError, Result};
use crate::matrix::BinUnit;

/// Base-pair ladder assumed before a file-stat arrives.
pub const DEFAULT_BP_RESOLUTIONS: [u32; 9] = [
    2_500_000, 1_000_000, 500_000, 250_000, 100_000, 50_000, 25_000, 10_000, 5_000,
];

/// Fragment ladder assumed before a file-stat arrives.
pub const DEFAULT_FRAG_RESOLUTIONS: [u32; 8] = [500, 200, 100, 50, 20, 5, 2, 1];

/// A non-empty list of bin sizes, stored coarsest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLadder")]
pub struct ResolutionLadder {
    unit: BinUnit,
    resolutions: Vec<u32>,
}

#[derive(Deserialize)]
struct RawLadder {
    unit: BinUnit,
    resolutions: Vec<u32>,
}

impl TryFrom<RawLadder> for ResolutionLadder {
    type Error = HicError;

    fn try_from(raw: RawLadder) -> Result<Self> {
        Self::new(raw.unit, raw.resolutions)
    }
}

impl ResolutionLadder {
    /// Build a ladder. Input order does not matter; duplicates are dropped.
    pub fn new(unit: BinUnit, mut resolutions: Vec<u32>) -> Result<Self> {
        if resolutions.iter().any(|&r| r == 0) {
            return Err(HicError::InvalidConfig(format!(
                "{} resolution ladder contains a zero bin size",
                unit
            )));
        }
        resolutions.sort_unstable_by(|a, b| b.cmp(a));
        resolutions.dedup();
        if resolutions.is_empty() {
            return Err(HicError::EmptyResolutionLadder(unit.to_string()));
        }
        Ok(Self { unit, resolutions })
    }

    pub fn default_base_pair() -> Self {
        Self {
            unit: BinUnit::BasePair,
            resolutions: DEFAULT_BP_RESOLUTIONS.to_vec(),
        }
    }

    pub fn default_fragment() -> Self {
        Self {
            unit: BinUnit::Fragment,
            resolutions: DEFAULT_FRAG_RESOLUTIONS.to_vec(),
        }
    }

    pub fn unit(&self) -> BinUnit {
        self.unit
    }

    /// Largest bin size.
    pub fn coarsest(&self) -> u32 {
        self.resolutions[0]
    }

    /// Smallest bin size.
    pub fn finest(&self) -> u32 {
        self.resolutions[self.resolutions.len() - 1]
    }

    /// Iterate coarsest → finest.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.resolutions.iter().copied()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.resolutions
    }

    pub fn len(&self) -> usize {
        self.resolutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolutions.is_empty()
    }

    pub fn contains(&self, resolution: u32) -> bool {
        self.resolutions.contains(&resolution)
    }

    /// Next finer step, if any.
    pub fn finer(&self, resolution: u32) -> Option<u32> {
        self.resolutions.iter().copied().find(|&r| r < resolution)
    }

    /// Next coarser step, if any.
    pub fn coarser(&self, resolution: u32) -> Option<u32> {
        self.resolutions.iter().rev().copied().find(|&r| r > resolution)
    }
}

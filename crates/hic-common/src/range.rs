//! Genomic ranges on a single chromosome.

use serde::{Deserialize, Serialize};

use crate::chromosome::ChromosomeRef;
use crate::error::{HicError, Result};

/// A half-open base-pair interval `[start, stop)` on one chromosome.
///
/// Ranges built through [`GenomicRange::new`] satisfy
/// `0 <= start < stop <= chr.length`.
///
/// Deserialized ranges carry no chromosome length, so only `start < stop`
/// is checked there.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct GenomicRange {
    pub chr: String,
    pub start: u64,
    pub stop: u64,
}

#[derive(Deserialize)]
struct RawRange {
    chr: String,
    start: u64,
    stop: u64,
}

impl TryFrom<RawRange> for GenomicRange {
    type Error = HicError;

    fn try_from(raw: RawRange) -> Result<Self> {
        if raw.start >= raw.stop {
            return Err(HicError::invalid_range(
                &raw.chr,
                raw.start,
                raw.stop,
                "start must be before stop",
            ));
        }
        Ok(Self {
            chr: raw.chr,
            start: raw.start,
            stop: raw.stop,
        })
    }
}

impl GenomicRange {
    /// Create a validated range on `chr`.
    pub fn new(chr: &ChromosomeRef, start: u64, stop: u64) -> Result<Self> {
        if start >= stop {
            return Err(HicError::invalid_range(
                &chr.name,
                start,
                stop,
                "start must be before stop",
            ));
        }
        if stop > chr.length {
            return Err(HicError::invalid_range(
                &chr.name,
                start,
                stop,
                format!("stop exceeds chromosome length {}", chr.length),
            ));
        }
        Ok(Self {
            chr: chr.name.clone(),
            start,
            stop,
        })
    }

    /// The whole chromosome.
    pub fn whole(chr: &ChromosomeRef) -> Self {
        Self {
            chr: chr.name.clone(),
            start: 0,
            stop: chr.length,
        }
    }

    /// Width in base pairs.
    pub fn span(&self) -> u64 {
        self.stop.saturating_sub(self.start)
    }

    pub fn contains(&self, pos: u64) -> bool {
        pos >= self.start && pos < self.stop
    }

    /// Whether a bin `[pos, pos + width)` overlaps this range.
    pub fn overlaps_bin(&self, pos: u64, width: u64) -> bool {
        pos < self.stop && pos.saturating_add(width) > self.start
    }

    pub fn center(&self) -> u64 {
        self.start + self.span() / 2
    }

    /// Whether both ranges sit on the same chromosome (case-insensitive).
    pub fn same_chromosome(&self, other: &GenomicRange) -> bool {
        self.chr.eq_ignore_ascii_case(&other.chr)
    }
}

impl std::fmt::Display for GenomicRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}-{}", self.chr, self.start, self.stop)
    }
}

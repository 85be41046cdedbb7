//! Restriction-fragment indexes.
//!
//! A fragment is the interval between consecutive cut sites of one enzyme.
//! Fragment ids are positions in the chromosome's fragment list, so id `i`
//! covers `[site[i-1], site[i])` with the chromosome ends as outer bounds:
//!
//! ```text
//!   0        s0        s1        s2              length
//!   |--------|---------|---------|-----------------|
//!     id 0      id 1      id 2         id 3
//! ```

mod cache;

pub use cache::FragmentIndexCache;

use hic_common::{ChromosomeRef, GenomicRange, HicError, Result};
use serde::{Deserialize, Serialize};

/// Genomic extent of one fragment, `[start, stop)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub start: u64,
    pub stop: u64,
}

/// Inclusive range of fragment ids visible on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FragmentWindow {
    pub first: u64,
    pub last: u64,
}

impl FragmentWindow {
    pub fn new(first: u64, last: u64) -> Self {
        Self { first, last }
    }

    /// Number of fragments in the window.
    pub fn len(&self) -> u64 {
        if self.last < self.first {
            0
        } else {
            self.last - self.first + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.last < self.first
    }

    pub fn contains(&self, id: u64) -> bool {
        id >= self.first && id <= self.last
    }

    /// Whether a bin of `resolution` fragments starting at `id` overlaps the window.
    pub fn overlaps_bin(&self, id: u64, resolution: u64) -> bool {
        id <= self.last && id.saturating_add(resolution) > self.first
    }
}

/// Fragment id → genomic span for one (chromosome, enzyme).
///
/// Built once and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentIndex {
    chromosome: String,
    enzyme: String,
    fragments: Vec<Fragment>,
}

impl FragmentIndex {
    /// Build the index from raw cut-site positions.
    ///
    /// Sites are sorted and de-duplicated; sites at `0` or at/after the
    /// chromosome end are ignored.
    pub fn from_cut_sites(chromosome: &ChromosomeRef, enzyme: &str, mut sites: Vec<u64>) -> Self {
        sites.sort_unstable();
        sites.dedup();
        sites.retain(|&s| s > 0 && s < chromosome.length);

        let mut fragments = Vec::with_capacity(sites.len() + 1);
        let mut start = 0;
        for site in sites {
            fragments.push(Fragment { start, stop: site });
            start = site;
        }
        fragments.push(Fragment {
            start,
            stop: chromosome.length,
        });

        Self {
            chromosome: chromosome.name.clone(),
            enzyme: enzyme.to_string(),
            fragments,
        }
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn enzyme(&self) -> &str {
        &self.enzyme
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn get(&self, id: u64) -> Option<Fragment> {
        usize::try_from(id).ok().and_then(|i| self.fragments.get(i)).copied()
    }

    /// Id of the fragment containing `pos`.
    pub fn fragment_at(&self, pos: u64) -> u64 {
        let idx = self.fragments.partition_point(|f| f.stop <= pos);
        idx.min(self.fragments.len() - 1) as u64
    }

    /// Fragments overlapping `range`.
    pub fn window(&self, range: &GenomicRange) -> Result<FragmentWindow> {
        if !range.chr.eq_ignore_ascii_case(&self.chromosome) {
            return Err(HicError::invalid_parameter(
                "range",
                format!(
                    "{} is not on {} (fragment index for {})",
                    range, self.chromosome, self.enzyme
                ),
            ));
        }
        let first = self.fragment_at(range.start);
        let last = self.fragment_at(range.stop.saturating_sub(1)).max(first);
        Ok(FragmentWindow::new(first, last))
    }

    /// Genomic extent of the bin of `count` fragments starting at `id`.
    ///
    /// The bin is truncated at the last fragment. `None` when `id` is past
    /// the end.
    pub fn span(&self, id: u64, count: u64) -> Option<(u64, u64)> {
        let first = self.get(id)?;
        let last_id = id
            .saturating_add(count.max(1) - 1)
            .min(self.fragments.len() as u64 - 1);
        let last = self.get(last_id)?;
        Some((first.start, last.stop))
    }
}

//! Resolution selection against a file's ladder.
//!
//! Every view mode runs the same scan: walk the ladder coarsest → finest and
//! take the first bin size that still yields at least `threshold` bins over
//! the reference span. Only the threshold and the span differ per mode.
//!
//! | mode              | span                          | threshold                   |
//! |-------------------|-------------------------------|-----------------------------|
//! | genome            | n/a                           | coarsest entry              |
//! | chromosome pair   | longer chromosome length      | `chromosome_pair_min_bins`  |
//! | detail (bp)       | longer visible range span     | `detail_min_bins`           |
//! | detail (fragment) | longer visible fragment count | `detail_min_bins`           |

use hic_common::{
    BinUnit, ChromosomeIndex, ChromosomeRef, GenomicRange, HicError, ResolutionLadder, Result,
    ViewState,
};
use tracing::debug;

use crate::config::EngineConfig;

/// Picks bin sizes per view mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionSelector {
    chromosome_pair_min_bins: u64,
    detail_min_bins: u64,
    initial_bin_count: u64,
}

impl Default for ResolutionSelector {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl ResolutionSelector {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            chromosome_pair_min_bins: config.chromosome_pair_min_bins,
            detail_min_bins: config.detail_min_bins,
            initial_bin_count: config.initial_bin_count,
        }
    }

    /// First (coarsest) resolution with `span / r >= threshold`, else the finest.
    pub fn scan(ladder: &ResolutionLadder, span: u64, threshold: u64) -> u32 {
        ladder
            .iter()
            .find(|&r| span / u64::from(r) >= threshold)
            .unwrap_or_else(|| ladder.finest())
    }

    /// Resolution for a base-pair view.
    ///
    /// Fragment ladders are rejected here; fragment detail views go through
    /// [`ResolutionSelector::fragment_resolution`] because their span is
    /// counted in fragments.
    pub fn select(&self, view: &ViewState, ladder: &ResolutionLadder) -> Result<u32> {
        if ladder.unit() != BinUnit::BasePair {
            return Err(HicError::invalid_parameter(
                "ladder",
                "view resolution requires a base-pair ladder",
            ));
        }

        let resolution = match view {
            ViewState::Genome => ladder.coarsest(),
            ViewState::ChromosomePair { x, y } => self.chromosome_pair_resolution(ladder, x, y),
            ViewState::Detail { x, y } => self.detail_resolution(ladder, x, y),
        };

        debug!(mode = view.mode_name(), resolution, "Selected resolution");
        Ok(resolution)
    }

    pub fn chromosome_pair_resolution(
        &self,
        ladder: &ResolutionLadder,
        x: &ChromosomeRef,
        y: &ChromosomeRef,
    ) -> u32 {
        Self::scan(
            ladder,
            ChromosomeIndex::longer_length(x, y),
            self.chromosome_pair_min_bins,
        )
    }

    pub fn detail_resolution(
        &self,
        ladder: &ResolutionLadder,
        x: &GenomicRange,
        y: &GenomicRange,
    ) -> u32 {
        Self::scan(ladder, x.span().max(y.span()), self.detail_min_bins)
    }

    /// Resolution over a fragment ladder; `fragment_span` is the fragment
    /// count of the longer axis window.
    pub fn fragment_resolution(&self, ladder: &ResolutionLadder, fragment_span: u64) -> u32 {
        Self::scan(ladder, fragment_span, self.detail_min_bins)
    }

    /// Width of the window opened around a clicked pixel.
    pub fn default_view_span(
        &self,
        ladder: &ResolutionLadder,
        x: &ChromosomeRef,
        y: &ChromosomeRef,
    ) -> u64 {
        self.initial_bin_count * u64::from(self.chromosome_pair_resolution(ladder, x, y))
    }
}

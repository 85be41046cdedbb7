//! Pixel ⇄ genomic conversions for navigation.
//!
//! A click in the chromosome-pair view opens a detail window of
//! `initial_bin_count` bins centred on the clicked bin. Pan and zoom inside
//! the detail view reuse the same clamp so every produced range satisfies
//! `0 <= start < stop <= chromosome length`.

use hic_common::{ChromosomeRef, GenomicRange, HicError, ResolutionLadder, Result};
use tracing::debug;

use crate::resolution::ResolutionSelector;

/// Converts viewport interactions into genomic windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewportMapper {
    selector: ResolutionSelector,
}

impl ViewportMapper {
    pub fn new(selector: ResolutionSelector) -> Self {
        Self { selector }
    }

    /// Detail window for a pixel clicked in the chromosome-pair view.
    ///
    /// Returns `(range on chrx, range on chry)`.
    pub fn position_from_pixel(
        &self,
        pixel_x: f64,
        pixel_y: f64,
        bin_pixel_size: f64,
        chrx: &ChromosomeRef,
        chry: &ChromosomeRef,
        ladder: &ResolutionLadder,
    ) -> Result<(GenomicRange, GenomicRange)> {
        if !(bin_pixel_size.is_finite() && bin_pixel_size > 0.0) {
            return Err(HicError::invalid_parameter(
                "bin_pixel_size",
                format!("must be positive, got {}", bin_pixel_size),
            ));
        }

        let resolution = self.selector.chromosome_pair_resolution(ladder, chrx, chry);
        let span = self.selector.default_view_span(ladder, chrx, chry);

        let center_x = pixel_to_bp(pixel_x, bin_pixel_size, resolution)?;
        let center_y = pixel_to_bp(pixel_y, bin_pixel_size, resolution)?;

        let half = signed(span / 2);
        let x = clamp_window(chrx, center_x.saturating_sub(half), span)?;
        let y = clamp_window(chry, center_y.saturating_sub(half), span)?;

        debug!(
            pixel_x,
            pixel_y,
            resolution,
            range_x = %x,
            range_y = %y,
            "Mapped pixel to detail window"
        );
        Ok((x, y))
    }

    /// Shift a range by `delta_bp`, keeping its width.
    pub fn pan(&self, range: &GenomicRange, chr: &ChromosomeRef, delta_bp: i64) -> Result<GenomicRange> {
        let start = signed(range.start).saturating_add(delta_bp);
        clamp_window(chr, start, range.span())
    }

    /// Rescale a range by `factor` around `focus` (0 = start, 1 = stop).
    ///
    /// `factor < 1` zooms in. The width never drops below one finest bin.
    pub fn zoom(
        &self,
        range: &GenomicRange,
        chr: &ChromosomeRef,
        factor: f64,
        focus: f64,
        ladder: &ResolutionLadder,
    ) -> Result<GenomicRange> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(HicError::invalid_parameter(
                "factor",
                format!("must be positive, got {}", factor),
            ));
        }
        let focus = if focus.is_finite() { focus.clamp(0.0, 1.0) } else { 0.5 };

        let width = range.span() as f64;
        let new_width = ((width * factor).round() as u64).max(u64::from(ladder.finest()));
        let anchor = range.start as f64 + focus * width;
        let start = (anchor - focus * new_width as f64).round() as i64;

        clamp_window(chr, start, new_width)
    }
}

/// Pixel offset of `pos` inside a detail range.
pub fn genomic_to_pixel(range: &GenomicRange, pos: u64, px_per_bp: f64) -> f64 {
    (pos as f64 - range.start as f64) * px_per_bp
}

/// Genomic position under `pixel`, clamped to the range.
pub fn pixel_to_genomic(range: &GenomicRange, pixel: f64, px_per_bp: f64) -> u64 {
    if px_per_bp <= 0.0 || !pixel.is_finite() {
        return range.start;
    }
    let offset = (pixel / px_per_bp).floor().max(0.0) as u64;
    (range.start + offset).min(range.stop.saturating_sub(1))
}

/// Pixels per base pair when `range` fills `canvas_px`.
pub fn px_per_bp(range: &GenomicRange, canvas_px: f64) -> f64 {
    canvas_px / range.span().max(1) as f64
}

fn pixel_to_bp(pixel: f64, bin_pixel_size: f64, resolution: u32) -> Result<i64> {
    if !pixel.is_finite() {
        return Err(HicError::invalid_parameter(
            "pixel",
            format!("must be finite, got {}", pixel),
        ));
    }
    Ok((pixel / bin_pixel_size * f64::from(resolution)).floor() as i64)
}

fn signed(bp: u64) -> i64 {
    i64::try_from(bp).unwrap_or(i64::MAX)
}

/// Place a `span`-wide window starting at `start`, pushed back inside
/// `[0, chr.length]`. Chromosomes shorter than `span` yield the whole chromosome.
pub(crate) fn clamp_window(chr: &ChromosomeRef, start: i64, span: u64) -> Result<GenomicRange> {
    let length = chr.length;
    if span >= length {
        return GenomicRange::new(chr, 0, length);
    }

    let stop = start.saturating_add(signed(span));
    let (start, stop) = if start < 0 {
        (0, span)
    } else if stop as u64 > length {
        (length - span, length)
    } else {
        (start as u64, stop as u64)
    };
    GenomicRange::new(chr, start, stop)
}

//! Range-relative cells for the detail view.
//!
//! Each triple `(a, b, value)` is split across the two pixel axes according
//! to the first-axis flag:
//!
//! ```text
//! is_first_axis_x = true    a → Y axis (origin range_y.start, px_per_bp_y)
//!                           b → X axis (origin range_x.start, px_per_bp_x)
//! is_first_axis_x = false   a → X axis, b → Y axis
//! ```
//!
//! At fragment resolution `a` and `b` are fragment ids. They are first
//! translated to genomic spans through the fragment index of the axis they
//! land on, then scaled like base-pair positions.

use std::sync::Arc;

use hic_common::{BinUnit, GenomicRange, HicError, MatrixTriple, PixelCell, Result};

use crate::fragment::FragmentIndex;

/// Geometry of one detail query.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailParams {
    pub is_first_axis_x: bool,
    pub is_intra_chromosomal: bool,
    pub px_per_bp_x: f64,
    pub px_per_bp_y: f64,
    /// Base pairs per bin, or fragments per bin for [`BinUnit::Fragment`].
    pub resolution: u32,
    pub range_x: GenomicRange,
    pub range_y: GenomicRange,
    pub unit: BinUnit,
}

/// Fragment indexes for the chromosomes on each pixel axis.
#[derive(Debug, Clone)]
pub struct FragmentAxes {
    pub x: Arc<FragmentIndex>,
    pub y: Arc<FragmentIndex>,
}

/// Map detail triples to pixel cells relative to the visible ranges.
///
/// Fragment ids past the end of their index are dropped. Fails with
/// [`HicError::FragmentIndexMissing`] when fragment-unit data arrives without
/// fragment indexes.
pub fn calculate_coordinates(
    params: &DetailParams,
    triples: &[MatrixTriple],
    fragments: Option<&FragmentAxes>,
) -> Result<Vec<PixelCell>> {
    for (name, scale) in [("px_per_bp_x", params.px_per_bp_x), ("px_per_bp_y", params.px_per_bp_y)] {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(HicError::invalid_parameter(
                name,
                format!("must be positive, got {}", scale),
            ));
        }
    }

    let axes = match params.unit {
        BinUnit::BasePair => None,
        BinUnit::Fragment => {
            let axes = fragments.ok_or_else(|| {
                HicError::FragmentIndexMissing(format!(
                    "{} / {}",
                    params.range_x.chr, params.range_y.chr
                ))
            })?;
            check_axis(&axes.x, &params.range_x)?;
            check_axis(&axes.y, &params.range_y)?;
            Some(axes)
        }
    };

    let mapper = CellMapper { params, axes };
    let mut cells = Vec::with_capacity(if params.is_intra_chromosomal {
        triples.len() * 2
    } else {
        triples.len()
    });

    for triple in triples {
        let (on_x, on_y) = if params.is_first_axis_x {
            (triple.y, triple.x)
        } else {
            (triple.x, triple.y)
        };

        if let Some(cell) = mapper.map(on_x, on_y, triple.value) {
            cells.push(cell);
        }
        if params.is_intra_chromosomal {
            if let Some(cell) = mapper.map(on_y, on_x, triple.value) {
                cells.push(cell);
            }
        }
    }
    Ok(cells)
}

fn check_axis(index: &FragmentIndex, range: &GenomicRange) -> Result<()> {
    if index.chromosome().eq_ignore_ascii_case(&range.chr) {
        Ok(())
    } else {
        Err(HicError::FragmentIndexMissing(format!(
            "{} (index given is for {})",
            range.chr,
            index.chromosome()
        )))
    }
}

struct CellMapper<'a> {
    params: &'a DetailParams,
    axes: Option<&'a FragmentAxes>,
}

impl CellMapper<'_> {
    /// Genomic `[start, stop)` of the bin at `pos` on one axis.
    fn bin_span(&self, pos: u64, index: Option<&FragmentIndex>) -> Option<(u64, u64)> {
        let resolution = u64::from(self.params.resolution.max(1));
        match index {
            Some(index) => index.span(pos, resolution),
            None => Some((pos, pos + resolution)),
        }
    }

    fn map(&self, on_x: u64, on_y: u64, value: f64) -> Option<PixelCell> {
        let p = self.params;
        let (x_start, x_stop) = self.bin_span(on_x, self.axes.map(|a| a.x.as_ref()))?;
        let (y_start, y_stop) = self.bin_span(on_y, self.axes.map(|a| a.y.as_ref()))?;

        let x = (x_start as f64 - p.range_x.start as f64) * p.px_per_bp_x;
        let y = (y_start as f64 - p.range_y.start as f64) * p.px_per_bp_y;
        let width = ((x_stop - x_start) as f64 * p.px_per_bp_x).round();
        let height = ((y_stop - y_start) as f64 * p.px_per_bp_y).round();

        Some(PixelCell::new(x, y, width, height, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hic_common::ChromosomeRef;
    use test_utils::{create_cut_sites, genome};

    fn bp_params(is_first_axis_x: bool, is_intra: bool) -> DetailParams {
        let chr1 = ChromosomeRef::new("chr1", genome::CHR1_LENGTH);
        let chr2 = ChromosomeRef::new("chr2", genome::CHR2_LENGTH);
        DetailParams {
            is_first_axis_x,
            is_intra_chromosomal: is_intra,
            px_per_bp_x: 0.5,
            px_per_bp_y: 0.25,
            resolution: 100,
            range_x: GenomicRange::new(&chr1, 1_000, 2_000).unwrap(),
            range_y: GenomicRange::new(&chr2, 5_000, 7_000).unwrap(),
            unit: BinUnit::BasePair,
        }
    }

    #[test]
    fn test_first_axis_feeds_y() {
        let triples = [MatrixTriple::new(5_200, 1_300, 7.0)];
        let cells = calculate_coordinates(&bp_params(true, false), &triples, None).unwrap();
        assert_eq!(cells, vec![PixelCell::new(150.0, 50.0, 50.0, 25.0, 7.0)]);
    }

    #[test]
    fn test_first_axis_feeds_x() {
        let triples = [MatrixTriple::new(1_300, 5_200, 7.0)];
        let cells = calculate_coordinates(&bp_params(false, false), &triples, None).unwrap();
        assert_eq!(cells, vec![PixelCell::new(150.0, 50.0, 50.0, 25.0, 7.0)]);
    }

    #[test]
    fn test_wiring_table() {
        // (is_first_axis_x, a, b) -> expected (x, y)
        let cases = [
            (true, 5_000, 1_000, (0.0, 0.0)),
            (true, 7_000, 2_000, (500.0, 500.0)),
            (false, 1_000, 5_000, (0.0, 0.0)),
            (false, 1_500, 6_000, (250.0, 250.0)),
        ];
        for (first_x, a, b, (x, y)) in cases {
            let cells = calculate_coordinates(
                &bp_params(first_x, false),
                &[MatrixTriple::new(a, b, 1.0)],
                None,
            )
            .unwrap();
            assert_eq!((cells[0].x, cells[0].y), (x, y), "first_x={} a={} b={}", first_x, a, b);
        }
    }

    #[test]
    fn test_intra_mirror_on_shared_range() {
        let chr = ChromosomeRef::new("chr1", genome::CHR1_LENGTH);
        let range = GenomicRange::new(&chr, 10_000, 20_000).unwrap();
        let params = DetailParams {
            is_first_axis_x: true,
            is_intra_chromosomal: true,
            px_per_bp_x: 0.06,
            px_per_bp_y: 0.06,
            resolution: 500,
            range_x: range.clone(),
            range_y: range,
            unit: BinUnit::BasePair,
        };
        let triples = [MatrixTriple::new(10_000, 15_000, 3.0)];
        let cells = calculate_coordinates(&params, &triples, None).unwrap();

        assert_eq!(cells.len(), 2);
        assert_eq!(cells[1], cells[0].transposed());
        assert_eq!(cells[0].width, 30.0);
    }

    fn fragment_axes() -> (FragmentAxes, GenomicRange) {
        let mini = ChromosomeRef::new("mini", 1_000);
        let index = Arc::new(FragmentIndex::from_cut_sites(
            &mini,
            "HindIII",
            create_cut_sites(1_000, 100),
        ));
        (
            FragmentAxes {
                x: index.clone(),
                y: index,
            },
            GenomicRange::whole(&mini),
        )
    }

    fn fragment_params(range: GenomicRange) -> DetailParams {
        DetailParams {
            is_first_axis_x: false,
            is_intra_chromosomal: false,
            px_per_bp_x: 0.6,
            px_per_bp_y: 0.6,
            resolution: 2,
            range_x: range.clone(),
            range_y: range,
            unit: BinUnit::Fragment,
        }
    }

    #[test]
    fn test_fragment_ids_translate_through_index() {
        let (axes, range) = fragment_axes();
        let triples = [
            MatrixTriple::new(2, 4, 1.0),
            MatrixTriple::new(9, 0, 2.0),
            MatrixTriple::new(10, 0, 3.0),
        ];
        let cells = calculate_coordinates(&fragment_params(range), &triples, Some(&axes)).unwrap();

        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0], PixelCell::new(120.0, 240.0, 120.0, 120.0, 1.0));
        // id 9 is the last fragment; the bin is truncated to it
        assert_eq!(cells[1], PixelCell::new(540.0, 0.0, 60.0, 120.0, 2.0));
    }

    #[test]
    fn test_fragment_without_index_fails() {
        let (_, range) = fragment_axes();
        let err = calculate_coordinates(&fragment_params(range), &[MatrixTriple::new(0, 0, 1.0)], None)
            .unwrap_err();
        assert!(matches!(err, HicError::FragmentIndexMissing(_)));
    }

    #[test]
    fn test_fragment_index_for_wrong_chromosome_fails() {
        let (axes, _) = fragment_axes();
        let chr = ChromosomeRef::new("chr1", 1_000);
        let params = fragment_params(GenomicRange::whole(&chr));
        assert!(calculate_coordinates(&params, &[], Some(&axes)).is_err());
    }

    #[test]
    fn test_rejects_bad_scale() {
        let mut params = bp_params(true, false);
        params.px_per_bp_y = 0.0;
        assert!(calculate_coordinates(&params, &[], None).is_err());
    }
}

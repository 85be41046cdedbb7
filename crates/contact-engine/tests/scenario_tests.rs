//! Reference scenarios for resolution selection, pixel mapping, grid
//! formatting and colour calibration.

use contact_engine::normalizer::genome_pairs;
use contact_engine::{format_data, genome_color_domain, PairBatch, ResolutionSelector, ViewportMapper};
use hic_common::{
    BinUnit, ChromosomeIndex, ChromosomeRef, ColorDomain, MatrixTriple, PixelCell,
    ResolutionLadder, ViewState,
};
use test_utils::{
    assert_contains_cell, genome, ladders,
    triples::{genome_wide_batch, INTRA_500KB},
};

fn bp_ladder() -> ResolutionLadder {
    ResolutionLadder::new(BinUnit::BasePair, ladders::BP.to_vec()).unwrap()
}

fn chr1() -> ChromosomeRef {
    ChromosomeRef::new("chr1", genome::CHR1_LENGTH)
}

fn chr2() -> ChromosomeRef {
    ChromosomeRef::new("chr2", genome::CHR2_LENGTH)
}

// ============================================================================
// Resolution selection
// ============================================================================

#[test]
fn test_chromosome_pair_resolution() {
    let selector = ResolutionSelector::default();
    let view = ViewState::ChromosomePair { x: chr1(), y: chr2() };
    assert_eq!(selector.select(&view, &bp_ladder()).unwrap(), 1_000_000);
}

#[test]
fn test_genome_view_uses_coarsest() {
    let selector = ResolutionSelector::default();
    assert_eq!(selector.select(&ViewState::Genome, &bp_ladder()).unwrap(), 2_500_000);
}

// ============================================================================
// Pixel → detail window
// ============================================================================

#[test]
fn test_position_from_pixel() {
    let mapper = ViewportMapper::default();
    let (x, y) = mapper
        .position_from_pixel(260.12890625, 62.7734375, 3.0, &chr1(), &chr2(), &bp_ladder())
        .unwrap();

    assert_eq!((x.chr.as_str(), x.start, x.stop), ("chr1", 76_709_635, 96_709_635));
    assert_eq!((y.chr.as_str(), y.start, y.stop), ("chr2", 10_924_479, 30_924_479));
}

#[test]
fn test_position_from_pixel_clamps_to_chromosome_end() {
    let mapper = ViewportMapper::default();
    let (x, y) = mapper
        .position_from_pixel(1000.0, 1000.0, 3.0, &chr1(), &chr2(), &bp_ladder())
        .unwrap();

    assert_eq!((x.start, x.stop), (223_199_373, genome::CHR1_LENGTH));
    assert_eq!((y.start, y.stop), (229_250_621, genome::CHR2_LENGTH));
    assert_eq!(x.span(), 20_000_000);
}

// ============================================================================
// Grid formatting
// ============================================================================

#[test]
fn test_intra_chromosomal_mirroring() {
    let triples: Vec<MatrixTriple> = INTRA_500KB.iter().copied().map(MatrixTriple::from).collect();
    let cells = format_data(&triples, 2.0, 500_000, true, true);

    assert_eq!(cells.len(), 8);
    let xyv: Vec<(f64, f64, f64)> = cells.iter().map(PixelCell::xyv).collect();
    assert_contains_cell!(xyv, (0.0, 2.0, 9454.0));
    assert_contains_cell!(xyv, (2.0, 0.0, 9454.0));
    assert_contains_cell!(xyv, (0.0, 0.0, 13263.0));
}

// ============================================================================
// Colour domain
// ============================================================================

#[test]
fn test_genome_color_domain_skips_chrm_and_chry() {
    let batches: Vec<PairBatch> = genome_wide_batch()
        .into_iter()
        .map(|(x, y, t)| PairBatch::new(x, y, t.into_iter().map(MatrixTriple::from).collect()))
        .collect();

    assert_eq!(
        genome_color_domain(&batches),
        Some(ColorDomain::new(343.0, 116_455.0))
    );
}

#[test]
fn test_genome_pairs_are_upper_triangle_of_analyzable() {
    let index = ChromosomeIndex::new(
        genome::CHROMOSOMES
            .iter()
            .map(|(name, length)| ChromosomeRef::new(*name, *length))
            .collect(),
    )
    .unwrap();

    let pairs: Vec<(String, String)> = genome_pairs(&index)
        .into_iter()
        .map(|(x, y)| (x.name, y.name))
        .collect();

    assert_eq!(pairs.len(), 10);
    assert_eq!(pairs[0], ("chr1".to_string(), "chr1".to_string()));
    assert_eq!(pairs[1], ("chr1".to_string(), "chr2".to_string()));
    assert!(pairs.iter().all(|(x, y)| !["chrY", "chrM"].contains(&x.as_str())
        && !["chrY", "chrM"].contains(&y.as_str())));
}

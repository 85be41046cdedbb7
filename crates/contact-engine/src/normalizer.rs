//! Colour-domain calibration.
//!
//! The domain is the min/max of fetched values. Whole-genome aggregation
//! only ever covers analyzable chromosomes: chrM and chrY carry sparse,
//! noisy signal that would stretch the colour scale.

use hic_common::chromosome::is_analyzable_name;
use hic_common::{ChromosomeIndex, ChromosomeRef, ColorDomain, MatrixTriple};

/// Triples fetched for one chromosome pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairBatch {
    pub chromosome_x: String,
    pub chromosome_y: String,
    pub triples: Vec<MatrixTriple>,
}

impl PairBatch {
    pub fn new(
        chromosome_x: impl Into<String>,
        chromosome_y: impl Into<String>,
        triples: Vec<MatrixTriple>,
    ) -> Self {
        Self {
            chromosome_x: chromosome_x.into(),
            chromosome_y: chromosome_y.into(),
            triples,
        }
    }

    /// Both chromosomes contribute to the genome-wide scale.
    pub fn is_analyzable(&self) -> bool {
        is_analyzable_name(&self.chromosome_x) && is_analyzable_name(&self.chromosome_y)
    }
}

/// Min/max over all values in one scan, ignoring `NaN`.
///
/// `None` means no renderable value: the caller shows the
/// "all cells below render threshold" state.
pub fn sort_data(triples: &[MatrixTriple]) -> Option<ColorDomain> {
    let mut values = triples.iter().map(|t| t.value).filter(|v| !v.is_nan());
    let first = values.next()?;
    let mut domain = ColorDomain::new(first, first);
    for value in values {
        domain.include(value);
    }
    Some(domain)
}

/// Domain across the analyzable pair batches of a genome-wide load.
pub fn genome_color_domain(batches: &[PairBatch]) -> Option<ColorDomain> {
    batches
        .iter()
        .filter(|batch| batch.is_analyzable())
        .filter_map(|batch| sort_data(&batch.triples))
        .reduce(|a, b| a.merge(&b))
}

/// Upper-triangle chromosome pairs requested by the genome view, in file order.
pub fn genome_pairs(index: &ChromosomeIndex) -> Vec<(ChromosomeRef, ChromosomeRef)> {
    let chromosomes = index.analyzable();
    let mut pairs = Vec::with_capacity(chromosomes.len() * (chromosomes.len() + 1) / 2);
    for (i, x) in chromosomes.iter().enumerate() {
        for y in &chromosomes[i..] {
            pairs.push(((*x).clone(), (*y).clone()));
        }
    }
    pairs
}

//! The three nested zoom levels of a contact-matrix chart.

use serde::{Deserialize, Serialize};

use crate::chromosome::ChromosomeRef;
use crate::range::GenomicRange;

/// What a chart currently shows. Replaced wholesale on every navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ViewState {
    /// All analyzable chromosomes against each other.
    Genome,
    /// One chromosome against another over their full lengths.
    ChromosomePair { x: ChromosomeRef, y: ChromosomeRef },
    /// Sub-chromosome windows at base-pair or fragment resolution.
    Detail { x: GenomicRange, y: GenomicRange },
}

impl ViewState {
    /// Whether both axes reference the same chromosome.
    pub fn is_intra_chromosomal(&self) -> bool {
        match self {
            ViewState::Genome => false,
            ViewState::ChromosomePair { x, y } => x.name.eq_ignore_ascii_case(&y.name),
            ViewState::Detail { x, y } => x.same_chromosome(y),
        }
    }

    /// Chromosome names on the X and Y axes, if the view has them.
    pub fn chromosome_names(&self) -> Option<(&str, &str)> {
        match self {
            ViewState::Genome => None,
            ViewState::ChromosomePair { x, y } => Some((&x.name, &y.name)),
            ViewState::Detail { x, y } => Some((&x.chr, &y.chr)),
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            ViewState::Genome => "genome",
            ViewState::ChromosomePair { .. } => "chromosome_pair",
            ViewState::Detail { .. } => "detail",
        }
    }
}

impl std::fmt::Display for ViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewState::Genome => write!(f, "genome"),
            ViewState::ChromosomePair { x, y } => write!(f, "{} x {}", x.name, y.name),
            ViewState::Detail { x, y } => write!(f, "{} x {}", x, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intra_chromosomal() {
        let chr1 = ChromosomeRef::new("chr1", 1_000);
        let chr2 = ChromosomeRef::new("chr2", 2_000);

        assert!(!ViewState::Genome.is_intra_chromosomal());
        assert!(ViewState::ChromosomePair { x: chr1.clone(), y: chr1.clone() }.is_intra_chromosomal());
        assert!(!ViewState::ChromosomePair { x: chr1.clone(), y: chr2.clone() }.is_intra_chromosomal());

        let detail = ViewState::Detail {
            x: GenomicRange::new(&chr1, 0, 100).unwrap(),
            y: GenomicRange::new(&ChromosomeRef::new("CHR1", 1_000), 200, 300).unwrap(),
        };
        assert!(detail.is_intra_chromosomal());
        assert_eq!(detail.chromosome_names(), Some(("chr1", "CHR1")));
    }

    #[test]
    fn test_serialized_tag() {
        let json = serde_json::to_value(ViewState::Genome).unwrap();
        assert_eq!(json["mode"], "genome");
    }
}

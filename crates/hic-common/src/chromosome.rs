//! Chromosome lookup derived from genome metadata.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use tracing::warn;

use crate::error::{HicError, Result};

/// A chromosome name and its length in base pairs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChromosomeRef {
    pub name: String,
    pub length: u64,
}

impl ChromosomeRef {
    pub fn new(name: impl Into<String>, length: u64) -> Self {
        Self {
            name: name.into(),
            length,
        }
    }

    /// Lookup key: the uppercased name.
    pub fn key(&self) -> String {
        self.name.to_uppercase()
    }

    /// Whether this chromosome takes part in genome-wide aggregation.
    pub fn is_analyzable(&self) -> bool {
        is_analyzable_name(&self.name)
    }
}

/// Returns false for mitochondrial, Y and the `.hic` "All" pseudo-chromosome.
///
/// Their signal is sparse and noisy and would distort the colour scale.
pub fn is_analyzable_name(name: &str) -> bool {
    let upper = name.to_uppercase();
    let bare = upper.strip_prefix("CHR").unwrap_or(&upper);
    !matches!(bare, "M" | "MT" | "Y" | "ALL")
}

/// Genome metadata as delivered by the host application.
///
/// ```json
/// { "chromosomes": { "chr1": { "length": 249250621 } } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenomeMetadata {
    pub chromosomes: BTreeMap<String, ChromosomeMeta>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChromosomeMeta {
    pub length: u64,
}

impl GenomeMetadata {
    /// Parse genome metadata from a JSON value.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| HicError::InvalidGenomeMetadata(e.to_string()))
    }
}

/// Static name → length lookup, keyed by uppercase name.
///
/// Built once when a file is opened and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct ChromosomeIndex {
    chromosomes: Vec<ChromosomeRef>,
    by_key: HashMap<String, usize>,
}

impl ChromosomeIndex {
    /// Build an index from an already-ordered chromosome list.
    ///
    /// Duplicate names (case-insensitive) and zero lengths are rejected.
    pub fn new(chromosomes: Vec<ChromosomeRef>) -> Result<Self> {
        if chromosomes.is_empty() {
            return Err(HicError::InvalidGenomeMetadata(
                "no chromosomes defined".to_string(),
            ));
        }

        let mut by_key = HashMap::with_capacity(chromosomes.len());
        for (i, chr) in chromosomes.iter().enumerate() {
            if chr.length == 0 {
                return Err(HicError::InvalidGenomeMetadata(format!(
                    "chromosome '{}' has zero length",
                    chr.name
                )));
            }
            if by_key.insert(chr.key(), i).is_some() {
                return Err(HicError::InvalidGenomeMetadata(format!(
                    "chromosome '{}' defined twice",
                    chr.name
                )));
            }
        }

        Ok(Self {
            chromosomes,
            by_key,
        })
    }

    /// Build an index from genome metadata in natural chromosome order.
    pub fn from_metadata(metadata: &GenomeMetadata) -> Result<Self> {
        Self::from_metadata_ordered(metadata, &[])
    }

    /// Build an index from genome metadata.
    ///
    /// Chromosomes named in `order` come first, in that order; the rest follow
    /// in natural order (1..22, X, Y, M, then by name). Names in `order` that
    /// the metadata does not define are skipped.
    pub fn from_metadata_ordered(metadata: &GenomeMetadata, order: &[String]) -> Result<Self> {
        Self::from_metadata_and_file(metadata, order, &[])
    }

    /// Build an index from genome metadata, corrected by the lengths a file
    /// reports for itself.
    ///
    /// File lengths win over metadata lengths, and chromosomes only the file
    /// knows are added. Either case is logged.
    pub fn from_metadata_and_file(
        metadata: &GenomeMetadata,
        order: &[String],
        file_lengths: &[(String, u64)],
    ) -> Result<Self> {
        let mut remaining: Vec<ChromosomeRef> = metadata
            .chromosomes
            .iter()
            .map(|(name, meta)| ChromosomeRef::new(name.clone(), meta.length))
            .collect();

        for (name, length) in file_lengths {
            let key = name.to_uppercase();
            match remaining.iter_mut().find(|c| c.key() == key) {
                Some(chr) if chr.length != *length => {
                    warn!(
                        chromosome = %chr.name,
                        metadata_length = chr.length,
                        file_length = *length,
                        "Chromosome length differs from file stat; using file stat"
                    );
                    chr.length = *length;
                }
                Some(_) => {}
                None => {
                    warn!(
                        chromosome = %name,
                        length = *length,
                        "Chromosome missing from genome metadata; adding from file stat"
                    );
                    remaining.push(ChromosomeRef::new(name.clone(), *length));
                }
            }
        }

        let mut ordered = Vec::with_capacity(remaining.len());
        for name in order {
            let key = name.to_uppercase();
            if let Some(pos) = remaining.iter().position(|c| c.key() == key) {
                ordered.push(remaining.remove(pos));
            }
        }

        remaining.sort_by(|a, b| natural_order(&a.name, &b.name));
        ordered.extend(remaining);

        Self::new(ordered)
    }

    /// Look up a chromosome by name (case-insensitive).
    pub fn find(&self, name: &str) -> Option<&ChromosomeRef> {
        self.by_key
            .get(&name.to_uppercase())
            .map(|&i| &self.chromosomes[i])
    }

    /// Look up a chromosome by name, failing with `UnknownChromosome`.
    pub fn get(&self, name: &str) -> Result<&ChromosomeRef> {
        self.find(name)
            .ok_or_else(|| HicError::UnknownChromosome(name.to_string()))
    }

    /// Position of a chromosome in file order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.by_key.get(&name.to_uppercase()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChromosomeRef> {
        self.chromosomes.iter()
    }

    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    /// Chromosomes that take part in genome-wide views, in file order.
    pub fn analyzable(&self) -> Vec<&ChromosomeRef> {
        self.chromosomes.iter().filter(|c| c.is_analyzable()).collect()
    }

    /// The longer of two chromosomes' lengths.
    pub fn longer_length(x: &ChromosomeRef, y: &ChromosomeRef) -> u64 {
        x.length.max(y.length)
    }
}

/// Sort key: numeric chromosomes ascending, then X, Y, M, then by name.
fn natural_order(a: &str, b: &str) -> Ordering {
    fn rank(name: &str) -> (u8, u64, String) {
        let upper = name.to_uppercase();
        let bare = upper.strip_prefix("CHR").unwrap_or(&upper).to_string();
        if let Ok(n) = bare.parse::<u64>() {
            return (0, n, String::new());
        }
        match bare.as_str() {
            "X" => (1, 0, String::new()),
            "Y" => (1, 1, String::new()),
            "M" | "MT" => (1, 2, String::new()),
            _ => (2, 0, bare),
        }
    }
    rank(a).cmp(&rank(b))
}

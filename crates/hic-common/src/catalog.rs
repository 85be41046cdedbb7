//! File-stat validation and the per-file catalog derived from it.
//!
//! The binary-format reader reports what a `.hic` file contains:
//!
//! ```json
//! {
//!   "normalizations": ["NONE", "VC", "VC_SQRT", "KR"],
//!   "chromosomes": { "chr1": 249250621, "chr2": 243199373 },
//!   "chrorder": ["chr1", "chr2"],
//!   "bpResolutions": [2500000, 1000000, 500000],
//!   "fragResolutions": [500, 200, 100]
//! }
//! ```
//!
//! The catalog starts from assumed defaults and is updated in place where the
//! file-stat disagrees. A missing or mis-shaped required field is fatal and
//! reported with a fixed message that the caller shows to the user as is.

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{HicError, Result};
use crate::ladder::ResolutionLadder;
use crate::matrix::{BinUnit, NormalizationMethod};

pub const MSG_CHROMOSOMES_MISSING: &str = "Chromosomes not found in file stat";
pub const MSG_CHRORDER_MISSING: &str = ".chrorder[] missing";
pub const MSG_CHRORDER_NOT_ARRAY: &str = ".chrorder[] should be array";
pub const MSG_CHRORDER_EMPTY: &str = ".chrorder[] empty array";
pub const MSG_BP_MISSING: &str = "Base pair-delimited resolutions not found in file stat";
pub const MSG_BP_NOT_ARRAY: &str = "Base pair-delimited resolutions should be array";
pub const MSG_BP_EMPTY: &str = "Base pair-delimited resolutions empty array";
pub const MSG_FRAG_MISSING: &str = "Fragment-delimited resolutions not found in file stat";
pub const MSG_FRAG_NOT_ARRAY: &str = "Fragment-delimited resolutions should be array";

/// What the engine knows about one open contact-matrix file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileCatalog {
    /// Balancing methods the file offers.
    pub normalizations: Vec<NormalizationMethod>,
    /// Chromosome lengths as recorded in the file, in file order.
    pub chromosome_lengths: Vec<(String, u64)>,
    /// Chromosome order used for axis assignment.
    pub chromosome_order: Vec<String>,
    /// Base-pair ladder.
    pub bp_resolutions: ResolutionLadder,
    /// Fragment ladder. `None` when the file has no fragment-level data.
    pub frag_resolutions: Option<ResolutionLadder>,
}

impl Default for FileCatalog {
    fn default() -> Self {
        Self {
            normalizations: NormalizationMethod::defaults(),
            chromosome_lengths: Vec::new(),
            chromosome_order: Vec::new(),
            bp_resolutions: ResolutionLadder::default_base_pair(),
            frag_resolutions: Some(ResolutionLadder::default_fragment()),
        }
    }
}

impl FileCatalog {
    /// Validate a file-stat and build a catalog from the defaults.
    pub fn from_file_stat(stat: &Value) -> Result<Self> {
        let mut catalog = Self::default();
        catalog.reconcile(stat)?;
        Ok(catalog)
    }

    /// Validate `stat` and update this catalog in place.
    ///
    /// Validation happens before any field is touched, so a rejected stat
    /// leaves the catalog unchanged.
    pub fn reconcile(&mut self, stat: &Value) -> Result<()> {
        let chromosome_lengths = parse_chromosomes(stat)?;
        let chromosome_order = parse_chrorder(stat)?;
        let bp = parse_resolutions(stat, "bpResolutions", MSG_BP_MISSING, MSG_BP_NOT_ARRAY)?;
        if bp.is_empty() {
            return Err(HicError::configuration(MSG_BP_EMPTY));
        }
        let bp_resolutions = ResolutionLadder::new(BinUnit::BasePair, bp)?;
        let frag = parse_resolutions(stat, "fragResolutions", MSG_FRAG_MISSING, MSG_FRAG_NOT_ARRAY)?;
        let frag_resolutions = if frag.is_empty() {
            None
        } else {
            Some(ResolutionLadder::new(BinUnit::Fragment, frag)?)
        };
        let normalizations = parse_normalizations(stat);

        if let Some(normalizations) = normalizations {
            if normalizations != self.normalizations {
                info!(
                    from = ?self.normalizations,
                    to = ?normalizations,
                    "Updating normalization methods from file stat"
                );
                self.normalizations = normalizations;
            }
        }

        if bp_resolutions != self.bp_resolutions {
            info!(
                resolutions = ?bp_resolutions.as_slice(),
                "Updating base pair-delimited resolutions from file stat"
            );
            self.bp_resolutions = bp_resolutions;
        }

        if frag_resolutions != self.frag_resolutions {
            info!(
                resolutions = ?frag_resolutions.as_ref().map(|l| l.as_slice().to_vec()),
                "Updating fragment-delimited resolutions from file stat"
            );
            self.frag_resolutions = frag_resolutions;
        }

        self.chromosome_lengths = chromosome_lengths;
        self.chromosome_order = chromosome_order;

        Ok(())
    }

    pub fn supports_normalization(&self, method: &NormalizationMethod) -> bool {
        self.normalizations.contains(method)
    }

    /// Ladder for a unit, if the file has one.
    pub fn ladder(&self, unit: BinUnit) -> Option<&ResolutionLadder> {
        match unit {
            BinUnit::BasePair => Some(&self.bp_resolutions),
            BinUnit::Fragment => self.frag_resolutions.as_ref(),
        }
    }
}

fn parse_chromosomes(stat: &Value) -> Result<Vec<(String, u64)>> {
    let map = match stat.get("chromosomes").and_then(Value::as_object) {
        Some(map) if !map.is_empty() => map,
        _ => return Err(HicError::configuration(MSG_CHROMOSOMES_MISSING)),
    };

    let mut lengths = Vec::with_capacity(map.len());
    for (name, value) in map {
        let length = value
            .as_u64()
            .or_else(|| value.get("length").and_then(Value::as_u64))
            .ok_or_else(|| HicError::configuration(MSG_CHROMOSOMES_MISSING))?;
        lengths.push((name.clone(), length));
    }
    Ok(lengths)
}

fn parse_chrorder(stat: &Value) -> Result<Vec<String>> {
    let value = stat
        .get("chrorder")
        .ok_or_else(|| HicError::configuration(MSG_CHRORDER_MISSING))?;
    let items = value
        .as_array()
        .ok_or_else(|| HicError::configuration(MSG_CHRORDER_NOT_ARRAY))?;
    if items.is_empty() {
        return Err(HicError::configuration(MSG_CHRORDER_EMPTY));
    }
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| HicError::configuration(MSG_CHRORDER_NOT_ARRAY))
        })
        .collect()
}

fn parse_resolutions(stat: &Value, field: &str, missing: &str, not_array: &str) -> Result<Vec<u32>> {
    let value = stat
        .get(field)
        .ok_or_else(|| HicError::configuration(missing))?;
    let items = value
        .as_array()
        .ok_or_else(|| HicError::configuration(not_array))?;
    items
        .iter()
        .map(|item| {
            item.as_u64()
                .and_then(|r| u32::try_from(r).ok())
                .ok_or_else(|| HicError::configuration(not_array))
        })
        .collect()
}

/// Normalizations are optional: absent or malformed keeps the defaults.
fn parse_normalizations(stat: &Value) -> Option<Vec<NormalizationMethod>> {
    let value = stat.get("normalizations")?;
    let Some(items) = value.as_array() else {
        warn!("normalizations in file stat is not an array; keeping defaults");
        return None;
    };
    let mut methods: Vec<NormalizationMethod> = items
        .iter()
        .filter_map(Value::as_str)
        .map(NormalizationMethod::from_str)
        .collect();
    if methods.is_empty() {
        warn!("file stat lists no normalization methods; keeping defaults");
        return None;
    }
    if !methods.contains(&NormalizationMethod::None) {
        methods.insert(0, NormalizationMethod::None);
    }
    Some(methods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_stat() -> Value {
        json!({
            "normalizations": ["NONE", "KR"],
            "chromosomes": { "chr1": 249250621, "chr2": { "length": 243199373 } },
            "chrorder": ["chr1", "chr2"],
            "bpResolutions": [1000000, 2500000, 5000],
            "fragResolutions": [500, 1]
        })
    }

    fn message(stat: Value) -> String {
        FileCatalog::from_file_stat(&stat).unwrap_err().to_string()
    }

    #[test]
    fn test_valid_stat_updates_in_place() {
        let catalog = FileCatalog::from_file_stat(&valid_stat()).unwrap();
        assert_eq!(
            catalog.normalizations,
            vec![NormalizationMethod::None, NormalizationMethod::Kr]
        );
        assert_eq!(catalog.bp_resolutions.as_slice(), &[2_500_000, 1_000_000, 5_000]);
        assert_eq!(catalog.frag_resolutions.as_ref().unwrap().as_slice(), &[500, 1]);
        assert_eq!(catalog.chromosome_order, vec!["chr1", "chr2"]);
        assert!(catalog
            .chromosome_lengths
            .contains(&("chr2".to_string(), 243_199_373)));
    }

    #[test]
    fn test_chromosome_messages() {
        let mut stat = valid_stat();
        stat.as_object_mut().unwrap().remove("chromosomes");
        assert_eq!(message(stat), MSG_CHROMOSOMES_MISSING);

        let mut stat = valid_stat();
        stat["chromosomes"] = json!({});
        assert_eq!(message(stat), MSG_CHROMOSOMES_MISSING);
    }

    #[test]
    fn test_chrorder_messages() {
        let mut stat = valid_stat();
        stat.as_object_mut().unwrap().remove("chrorder");
        assert_eq!(message(stat), MSG_CHRORDER_MISSING);

        let mut stat = valid_stat();
        stat["chrorder"] = json!("chr1,chr2");
        assert_eq!(message(stat), MSG_CHRORDER_NOT_ARRAY);

        let mut stat = valid_stat();
        stat["chrorder"] = json!([]);
        assert_eq!(message(stat), MSG_CHRORDER_EMPTY);
    }

    #[test]
    fn test_resolution_messages() {
        let mut stat = valid_stat();
        stat.as_object_mut().unwrap().remove("bpResolutions");
        assert_eq!(message(stat), MSG_BP_MISSING);

        let mut stat = valid_stat();
        stat["bpResolutions"] = json!({ "a": 1 });
        assert_eq!(message(stat), MSG_BP_NOT_ARRAY);

        let mut stat = valid_stat();
        stat["bpResolutions"] = json!([]);
        assert_eq!(message(stat), MSG_BP_EMPTY);

        let mut stat = valid_stat();
        stat.as_object_mut().unwrap().remove("fragResolutions");
        assert_eq!(message(stat), MSG_FRAG_MISSING);

        let mut stat = valid_stat();
        stat["fragResolutions"] = json!(5);
        assert_eq!(message(stat), MSG_FRAG_NOT_ARRAY);
    }

    #[test]
    fn test_empty_fragment_ladder_means_no_fragment_data() {
        let mut stat = valid_stat();
        stat["fragResolutions"] = json!([]);
        let catalog = FileCatalog::from_file_stat(&stat).unwrap();
        assert!(catalog.frag_resolutions.is_none());
        assert!(catalog.ladder(BinUnit::Fragment).is_none());
        assert!(catalog.ladder(BinUnit::BasePair).is_some());
    }

    #[test]
    fn test_rejected_stat_leaves_catalog_untouched() {
        let mut catalog = FileCatalog::default();
        let before = catalog.clone();
        let mut stat = valid_stat();
        stat["fragResolutions"] = json!("nope");
        assert!(catalog.reconcile(&stat).is_err());
        assert_eq!(catalog, before);
    }

    #[test]
    fn test_malformed_normalizations_keep_defaults() {
        let mut stat = valid_stat();
        stat["normalizations"] = json!("KR");
        let catalog = FileCatalog::from_file_stat(&stat).unwrap();
        assert_eq!(catalog.normalizations, NormalizationMethod::defaults());

        let mut stat = valid_stat();
        stat["normalizations"] = json!(["KR", "SCALE"]);
        let catalog = FileCatalog::from_file_stat(&stat).unwrap();
        assert_eq!(catalog.normalizations[0], NormalizationMethod::None);
        assert!(catalog.supports_normalization(&NormalizationMethod::Other("SCALE".into())));
    }
}

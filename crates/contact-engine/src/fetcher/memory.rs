//! In-memory matrix source for tests and offline use.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use hic_common::{BinUnit, HicError, MatrixTriple, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{MatrixQuery, MatrixResponse, MatrixSource};

/// (chromosome X, chromosome Y, unit, resolution); names uppercase.
type MatrixKey = (String, String, BinUnit, u32);

/// (chromosome, enzyme); chromosome uppercase.
type SitesKey = (String, String);

/// Serves stored triples the way a matrix server would.
///
/// Matrices are stored once per chromosome pair; a query for the swapped
/// pair is answered with transposed triples. Detail and fragment queries
/// return only bins overlapping the requested windows.
#[derive(Debug, Default)]
pub struct InMemoryMatrixSource {
    matrices: HashMap<MatrixKey, Vec<MatrixTriple>>,
    sites: HashMap<SitesKey, Vec<u64>>,
    requests: AtomicU64,
    site_requests: AtomicU64,
    failing: AtomicBool,
}

impl InMemoryMatrixSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a matrix for a chromosome pair at one resolution.
    pub fn insert_matrix(
        &mut self,
        chromosome_x: &str,
        chromosome_y: &str,
        unit: BinUnit,
        resolution: u32,
        triples: Vec<MatrixTriple>,
    ) {
        let key = (
            chromosome_x.to_uppercase(),
            chromosome_y.to_uppercase(),
            unit,
            resolution,
        );
        self.matrices.insert(key, triples);
    }

    /// Builder form of [`InMemoryMatrixSource::insert_matrix`] for base-pair data.
    pub fn with_matrix(
        mut self,
        chromosome_x: &str,
        chromosome_y: &str,
        resolution: u32,
        triples: &[(u64, u64, f64)],
    ) -> Self {
        let triples = triples.iter().copied().map(MatrixTriple::from).collect();
        self.insert_matrix(chromosome_x, chromosome_y, BinUnit::BasePair, resolution, triples);
        self
    }

    pub fn insert_sites(&mut self, chromosome: &str, enzyme: &str, positions: Vec<u64>) {
        self.sites
            .insert((chromosome.to_uppercase(), enzyme.to_string()), positions);
    }

    pub fn with_sites(mut self, chromosome: &str, enzyme: &str, positions: Vec<u64>) -> Self {
        self.insert_sites(chromosome, enzyme, positions);
        self
    }

    /// Make every subsequent call fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `fetch` calls served so far.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }

    /// Number of `restriction_sites` calls served so far.
    pub fn site_request_count(&self) -> u64 {
        self.site_requests.load(Ordering::SeqCst)
    }

    /// Load every `*.json` fixture file in `dir`.
    pub fn from_fixture_dir(dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            HicError::InvalidConfig(format!("failed to read {}: {}", dir.display(), e))
        })?;

        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut source = Self::new();
        for path in &paths {
            let text = std::fs::read_to_string(path).map_err(|e| {
                HicError::InvalidConfig(format!("failed to read {}: {}", path.display(), e))
            })?;
            let fixture: Value = serde_json::from_str(&text).map_err(|e| {
                HicError::InvalidConfig(format!("invalid JSON in {}: {}", path.display(), e))
            })?;
            source.load_fixture(&fixture)?;
        }

        info!(
            dir = %dir.display(),
            files = paths.len(),
            matrices = source.matrices.len(),
            site_lists = source.sites.len(),
            "Loaded matrix fixtures"
        );
        Ok(source)
    }

    /// Merge one fixture document:
    ///
    /// ```json
    /// {
    ///   "matrices": [{ "chromosomeX": "chr1", "chromosomeY": "chr1",
    ///                  "unit": "BP", "resolution": 500000,
    ///                  "items": [[0, 0, 13263]] }],
    ///   "sites": [{ "chromosome": "chr1", "enzyme": "HindIII",
    ///               "positions": [16007, 24571] }]
    /// }
    /// ```
    pub fn load_fixture(&mut self, fixture: &Value) -> Result<()> {
        let doc: FixtureDoc = serde_json::from_value(fixture.clone())
            .map_err(|e| HicError::InvalidConfig(format!("invalid matrix fixture: {}", e)))?;

        for matrix in doc.matrices {
            let response = MatrixResponse::from_value(&json!({ "items": matrix.items }))
                .map_err(|e| HicError::InvalidConfig(format!("invalid matrix fixture: {}", e)))?;
            self.insert_matrix(
                &matrix.chromosome_x,
                &matrix.chromosome_y,
                matrix.unit,
                matrix.resolution,
                response.items,
            );
        }
        for sites in doc.sites {
            self.insert_sites(&sites.chromosome, &sites.enzyme, sites.positions);
        }
        Ok(())
    }

    fn stored(&self, query: &MatrixQuery) -> Option<Vec<MatrixTriple>> {
        let (x, y) = query.chromosomes();
        let (x, y) = (x.to_uppercase(), y.to_uppercase());
        let unit = query.unit();
        let resolution = query.resolution();

        if let Some(triples) = self.matrices.get(&(x.clone(), y.clone(), unit, resolution)) {
            return Some(triples.clone());
        }
        self.matrices
            .get(&(y, x, unit, resolution))
            .map(|triples| triples.iter().map(MatrixTriple::transposed).collect())
    }
}

fn in_window(query: &MatrixQuery, triple: &MatrixTriple) -> bool {
    let width = u64::from(query.resolution());
    match query {
        MatrixQuery::Genome { .. } | MatrixQuery::ChromosomePair { .. } => true,
        MatrixQuery::Detail { x, y, .. } => {
            let direct = x.overlaps_bin(triple.x, width) && y.overlaps_bin(triple.y, width);
            let mirrored = query.is_intra_chromosomal()
                && x.overlaps_bin(triple.y, width)
                && y.overlaps_bin(triple.x, width);
            direct || mirrored
        }
        MatrixQuery::Fragment { x, y, .. } => {
            let direct = x.overlaps_bin(triple.x, width) && y.overlaps_bin(triple.y, width);
            let mirrored = query.is_intra_chromosomal()
                && x.overlaps_bin(triple.y, width)
                && y.overlaps_bin(triple.x, width);
            direct || mirrored
        }
    }
}

#[async_trait]
impl MatrixSource for InMemoryMatrixSource {
    async fn fetch(&self, query: &MatrixQuery) -> Result<MatrixResponse> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(HicError::transport("in-memory source set to fail"));
        }

        let items: Vec<MatrixTriple> = self
            .stored(query)
            .unwrap_or_default()
            .into_iter()
            .filter(|t| in_window(query, t))
            .collect();

        debug!(
            mode = query.mode_name(),
            resolution = query.resolution(),
            items = items.len(),
            "Served in-memory matrix"
        );
        Ok(MatrixResponse::new(items))
    }

    async fn restriction_sites(&self, chromosome: &str, enzyme: &str) -> Result<Vec<u64>> {
        self.site_requests.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(HicError::transport("in-memory source set to fail"));
        }

        self.sites
            .get(&(chromosome.to_uppercase(), enzyme.to_string()))
            .cloned()
            .ok_or_else(|| {
                HicError::transport(format!(
                    "no restriction sites for {} / {}",
                    chromosome, enzyme
                ))
            })
    }
}

#[derive(Debug, Deserialize)]
struct FixtureDoc {
    #[serde(default)]
    matrices: Vec<FixtureMatrix>,
    #[serde(default)]
    sites: Vec<FixtureSites>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FixtureMatrix {
    chromosome_x: String,
    chromosome_y: String,
    #[serde(default)]
    unit: BinUnit,
    resolution: u32,
    items: Value,
}

#[derive(Debug, Deserialize)]
struct FixtureSites {
    chromosome: String,
    enzyme: String,
    positions: Vec<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::FragmentWindow;
    use hic_common::{ChromosomeRef, GenomicRange, MatrixType, NormalizationMethod};
    use std::io::Write;

    fn pair_query(x: &str, y: &str, resolution: u32) -> MatrixQuery {
        MatrixQuery::ChromosomePair {
            chromosome_x: x.to_string(),
            chromosome_y: y.to_string(),
            resolution,
            normalization: NormalizationMethod::None,
            matrix_type: MatrixType::Observed,
        }
    }

    #[tokio::test]
    async fn test_fetch_counts_requests() {
        let source = InMemoryMatrixSource::new().with_matrix("chr1", "chr1", 1_000, &[(0, 0, 1.0)]);
        let response = source.fetch(&pair_query("CHR1", "chr1", 1_000)).await.unwrap();
        assert_eq!(response.len(), 1);

        let missing = source.fetch(&pair_query("chr1", "chr1", 5_000)).await.unwrap();
        assert!(missing.is_empty());
        assert_eq!(source.request_count(), 2);
    }

    #[tokio::test]
    async fn test_swapped_pair_is_transposed() {
        let source = InMemoryMatrixSource::new().with_matrix("chr2", "chr1", 1_000, &[(5_000, 1_000, 7.0)]);
        let response = source.fetch(&pair_query("chr1", "chr2", 1_000)).await.unwrap();
        assert_eq!(response.items, vec![MatrixTriple::new(1_000, 5_000, 7.0)]);
    }

    #[tokio::test]
    async fn test_detail_filters_to_window() {
        let chr = ChromosomeRef::new("chr1", 100_000);
        let source = InMemoryMatrixSource::new().with_matrix(
            "chr1",
            "chr1",
            1_000,
            &[(0, 0, 1.0), (10_000, 20_000, 2.0), (20_000, 10_000, 3.0), (50_000, 90_000, 4.0)],
        );
        let query = MatrixQuery::Detail {
            x: GenomicRange::new(&chr, 9_500, 12_000).unwrap(),
            y: GenomicRange::new(&chr, 19_000, 21_000).unwrap(),
            resolution: 1_000,
            normalization: NormalizationMethod::None,
            matrix_type: MatrixType::Observed,
        };
        let response = source.fetch(&query).await.unwrap();
        let values: Vec<f64> = response.items.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![2.0, 3.0]);
    }

    #[tokio::test]
    async fn test_fragment_filters_to_window() {
        let mut source = InMemoryMatrixSource::new();
        source.insert_matrix(
            "mini",
            "mini",
            BinUnit::Fragment,
            2,
            vec![
                MatrixTriple::new(0, 0, 1.0),
                MatrixTriple::new(2, 4, 2.0),
                MatrixTriple::new(8, 8, 3.0),
            ],
        );
        let query = MatrixQuery::Fragment {
            chromosome_x: "mini".to_string(),
            chromosome_y: "mini".to_string(),
            x: FragmentWindow::new(1, 5),
            y: FragmentWindow::new(1, 5),
            resolution: 2,
            normalization: NormalizationMethod::None,
            matrix_type: MatrixType::Observed,
        };
        let response = source.fetch(&query).await.unwrap();
        let values: Vec<f64> = response.items.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![1.0, 2.0]);
    }

    #[tokio::test]
    async fn test_failing_source() {
        let source = InMemoryMatrixSource::new().with_sites("chr1", "HindIII", vec![10]);
        assert_eq!(source.restriction_sites("chr1", "HindIII").await.unwrap(), vec![10]);
        assert!(source.restriction_sites("chr1", "MboI").await.is_err());

        source.set_failing(true);
        let err = source.fetch(&pair_query("chr1", "chr1", 1)).await.unwrap_err();
        assert!(err.is_query());
    }

    #[tokio::test]
    async fn test_fixture_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("chr1.json")).unwrap();
        write!(
            file,
            r#"{{
                "matrices": [{{ "chromosomeX": "chr1", "chromosomeY": "chr1", "resolution": 500000,
                               "items": [[0, 0, 13263], [0, 500000, null]] }}],
                "sites": [{{ "chromosome": "chr1", "enzyme": "HindIII", "positions": [16007] }}]
            }}"#
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let source = InMemoryMatrixSource::from_fixture_dir(dir.path()).unwrap();
        let response = source.fetch(&pair_query("chr1", "chr1", 500_000)).await.unwrap();
        assert_eq!(response.len(), 2);
        assert!(response.items[1].value.is_nan());
        assert_eq!(source.restriction_sites("CHR1", "HindIII").await.unwrap(), vec![16007]);
    }

    #[test]
    fn test_bad_fixture_is_configuration_error() {
        let mut source = InMemoryMatrixSource::new();
        let err = source
            .load_fixture(&json!({
                "matrices": [{ "chromosomeX": "chr1", "chromosomeY": "chr1",
                               "resolution": 1, "items": [[-1, 0, 1]] }]
            }))
            .unwrap_err();
        assert!(matches!(err, HicError::InvalidConfig(_)));
        assert!(err.is_configuration());
        assert!(!err.is_query());
    }

    #[test]
    fn test_unparseable_fixture_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        let err = InMemoryMatrixSource::from_fixture_dir(dir.path()).unwrap_err();
        assert!(err.is_configuration());
        assert!(!err.is_query());
    }
}

//! Configuration for the contact engine.

use std::path::Path;

use hic_common::{HicError, MatrixType, NormalizationMethod, Result};
use serde::{Deserialize, Serialize};

/// Tunables for resolution selection, viewport mapping and fetching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum bins along the longer chromosome in the chromosome-pair view.
    pub chromosome_pair_min_bins: u64,

    /// Minimum bins along the longer visible span in the detail view.
    pub detail_min_bins: u64,

    /// Bins in the window opened around a clicked pixel.
    pub initial_bin_count: u64,

    /// Pixel size of one bin in the genome and chromosome-pair views.
    pub bin_pixel_size: f64,

    /// Detail canvas edge length in pixels (square canvas).
    pub detail_canvas_px: f64,

    /// How many (chromosome, enzyme) fragment indexes to keep.
    pub fragment_cache_capacity: usize,

    /// Timeout applied by the HTTP transport to each request.
    pub fetch_timeout_secs: u64,

    /// Chromosome-pair fetches in flight during a genome-wide load.
    pub genome_fetch_concurrency: usize,

    /// Normalization applied when a chart is created.
    pub default_normalization: NormalizationMethod,

    /// Matrix type requested when a chart is created.
    pub default_matrix_type: MatrixType,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chromosome_pair_min_bins: 200,
            detail_min_bins: 400,
            initial_bin_count: 20,
            bin_pixel_size: 3.0,
            detail_canvas_px: 600.0,
            fragment_cache_capacity: 32,
            fetch_timeout_secs: 30,
            genome_fetch_concurrency: 8,
            default_normalization: NormalizationMethod::None,
            default_matrix_type: MatrixType::Observed,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Load configuration from a YAML file, then apply environment overrides.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            HicError::InvalidConfig(format!("failed to read {}: {}", path.display(), e))
        })?;
        let mut config: EngineConfig = serde_yaml::from_str(&text).map_err(|e| {
            HicError::InvalidConfig(format!("failed to parse {}: {}", path.display(), e))
        })?;
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("HIC_CHROMOSOME_PAIR_MIN_BINS") {
            if let Ok(bins) = val.parse() {
                self.chromosome_pair_min_bins = bins;
            }
        }

        if let Ok(val) = std::env::var("HIC_DETAIL_MIN_BINS") {
            if let Ok(bins) = val.parse() {
                self.detail_min_bins = bins;
            }
        }

        if let Ok(val) = std::env::var("HIC_INITIAL_BIN_COUNT") {
            if let Ok(bins) = val.parse() {
                self.initial_bin_count = bins;
            }
        }

        if let Ok(val) = std::env::var("HIC_BIN_PIXEL_SIZE") {
            if let Ok(size) = val.parse() {
                self.bin_pixel_size = size;
            }
        }

        if let Ok(val) = std::env::var("HIC_DETAIL_CANVAS_PX") {
            if let Ok(size) = val.parse() {
                self.detail_canvas_px = size;
            }
        }

        if let Ok(val) = std::env::var("HIC_FRAGMENT_CACHE_CAPACITY") {
            if let Ok(capacity) = val.parse() {
                self.fragment_cache_capacity = capacity;
            }
        }

        if let Ok(val) = std::env::var("HIC_FETCH_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.fetch_timeout_secs = secs;
            }
        }

        if let Ok(val) = std::env::var("HIC_GENOME_FETCH_CONCURRENCY") {
            if let Ok(concurrency) = val.parse() {
                self.genome_fetch_concurrency = concurrency;
            }
        }

        if let Ok(val) = std::env::var("HIC_NORMALIZATION") {
            self.default_normalization = NormalizationMethod::from_str(&val);
        }

        if let Ok(val) = std::env::var("HIC_MATRIX_TYPE") {
            self.default_matrix_type = MatrixType::from_str(&val);
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.chromosome_pair_min_bins == 0 {
            return Err(HicError::InvalidConfig(
                "chromosome_pair_min_bins must be > 0".to_string(),
            ));
        }

        if self.detail_min_bins == 0 {
            return Err(HicError::InvalidConfig("detail_min_bins must be > 0".to_string()));
        }

        if self.initial_bin_count == 0 {
            return Err(HicError::InvalidConfig("initial_bin_count must be > 0".to_string()));
        }

        if !(self.bin_pixel_size.is_finite() && self.bin_pixel_size > 0.0) {
            return Err(HicError::InvalidConfig("bin_pixel_size must be > 0".to_string()));
        }

        if !(self.detail_canvas_px.is_finite() && self.detail_canvas_px > 0.0) {
            return Err(HicError::InvalidConfig("detail_canvas_px must be > 0".to_string()));
        }

        if self.fragment_cache_capacity == 0 {
            return Err(HicError::InvalidConfig(
                "fragment_cache_capacity must be > 0".to_string(),
            ));
        }

        if self.fetch_timeout_secs == 0 {
            return Err(HicError::InvalidConfig("fetch_timeout_secs must be > 0".to_string()));
        }

        if self.genome_fetch_concurrency == 0 {
            return Err(HicError::InvalidConfig(
                "genome_fetch_concurrency must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

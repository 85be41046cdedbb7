//! An open contact-matrix file.
//!
//! The session owns everything that is fixed once the file is open: the
//! validated catalog, the chromosome index and the ladders. Charts share it
//! through `Arc`. The fragment index cache is the only state that changes
//! afterwards, and it only ever grows or evicts whole immutable indexes.

use std::sync::Arc;

use hic_common::{
    BinUnit, ChromosomeIndex, ChromosomeRef, FileCatalog, GenomeMetadata, HicError,
    ResolutionLadder, Result,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::fetcher::{MatrixQuery, MatrixResponse, MatrixSource};
use crate::fragment::{FragmentIndex, FragmentIndexCache};
use crate::resolution::ResolutionSelector;
use crate::types::CacheStats;
use crate::viewport::ViewportMapper;

/// Shared, read-mostly state for one file.
pub struct HicSession {
    catalog: FileCatalog,
    index: ChromosomeIndex,
    source: Arc<dyn MatrixSource>,
    fragments: FragmentIndexCache,
    selector: ResolutionSelector,
    config: EngineConfig,
}

impl HicSession {
    /// Validate the file-stat and genome metadata and open a session.
    ///
    /// Configuration errors carry the message to show the user.
    pub fn open(
        file_stat: &Value,
        genome_metadata: &Value,
        source: Arc<dyn MatrixSource>,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;

        let catalog = FileCatalog::from_file_stat(file_stat)?;
        let metadata = GenomeMetadata::from_json(genome_metadata)?;
        let index = ChromosomeIndex::from_metadata_and_file(
            &metadata,
            &catalog.chromosome_order,
            &catalog.chromosome_lengths,
        )?;

        info!(
            chromosomes = index.len(),
            analyzable = index.analyzable().len(),
            bp_resolutions = catalog.bp_resolutions.len(),
            fragment_resolutions = catalog.frag_resolutions.as_ref().map(|l| l.len()).unwrap_or(0),
            normalizations = catalog.normalizations.len(),
            "Opened contact-matrix session"
        );

        Ok(Self {
            catalog,
            index,
            source,
            fragments: FragmentIndexCache::new(config.fragment_cache_capacity),
            selector: ResolutionSelector::from_config(&config),
            config,
        })
    }

    pub fn catalog(&self) -> &FileCatalog {
        &self.catalog
    }

    pub fn index(&self) -> &ChromosomeIndex {
        &self.index
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn selector(&self) -> &ResolutionSelector {
        &self.selector
    }

    pub fn mapper(&self) -> ViewportMapper {
        ViewportMapper::new(self.selector)
    }

    pub fn source(&self) -> &Arc<dyn MatrixSource> {
        &self.source
    }

    pub fn chromosome(&self, name: &str) -> Result<&ChromosomeRef> {
        self.index.get(name)
    }

    pub fn bp_ladder(&self) -> &ResolutionLadder {
        &self.catalog.bp_resolutions
    }

    /// The fragment ladder, or an error when the file has none.
    pub fn fragment_ladder(&self) -> Result<&ResolutionLadder> {
        self.catalog.ladder(BinUnit::Fragment).ok_or_else(|| {
            HicError::invalid_parameter("unit", "file has no fragment-delimited resolutions")
        })
    }

    /// Issue one query against the source.
    pub async fn fetch(&self, query: &MatrixQuery) -> Result<MatrixResponse> {
        let (x, y) = query.chromosomes();
        debug!(
            mode = query.mode_name(),
            chromosome_x = x,
            chromosome_y = y,
            resolution = query.resolution(),
            unit = %query.unit(),
            "Fetching matrix"
        );
        self.source.fetch(query).await
    }

    /// Fragment index for (chromosome, enzyme), built on first use.
    pub async fn fragment_index(&self, chromosome: &str, enzyme: &str) -> Result<Arc<FragmentIndex>> {
        let chr = self.index.get(chromosome)?.clone();
        let name = chr.name.clone();
        let source = self.source.clone();
        self.fragments
            .get_or_build(&name, enzyme, || async move {
                let sites = source.restriction_sites(&chr.name, enzyme).await?;
                Ok(FragmentIndex::from_cut_sites(&chr, enzyme, sites))
            })
            .await
    }

    /// Fragment index if already built; never fetches.
    pub async fn cached_fragment_index(
        &self,
        chromosome: &str,
        enzyme: &str,
    ) -> Result<Arc<FragmentIndex>> {
        self.fragments
            .get(chromosome, enzyme)
            .await
            .ok_or_else(|| HicError::FragmentIndexMissing(format!("{} / {}", chromosome, enzyme)))
    }

    pub async fn fragment_cache_stats(&self) -> CacheStats {
        self.fragments.stats().await
    }
}

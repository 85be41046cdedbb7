//! Multi-resolution engine for Hi-C contact matrices.
//!
//! This crate turns a chart's view (whole genome, chromosome pair, or a
//! base-pair/fragment detail window) into renderable pixel cells:
//!
//! - **Resolution selection**: pick a bin size from the file's ladder
//! - **Coordinate mapping**: genomic bp ⇄ bin index ⇄ device pixel
//! - **Fetching**: one request per query against a [`MatrixSource`]
//! - **Symmetry**: rebuild the half triangle the server omits
//! - **Fragments**: the same mapping at restriction-fragment resolution
//!
//! # Architecture
//!
//! ```text
//! navigation (pan / zoom / select)
//!      │
//!      ▼
//! ChartController::navigate(view)      generation += 1
//!      │
//!      ▼
//! ChartController::load()
//!      │
//!      ├─► ResolutionSelector (per view mode)
//!      │
//!      ├─► MatrixSource::fetch(query)
//!      │         │
//!      │         └─► generation moved on? discard
//!      │
//!      ├─► normalizer::sort_data(triples)      → ColorDomain
//!      │
//!      └─► format::grid / format::detail       → PixelCell[]
//!               │
//!               ▼
//!          RenderBatch for the renderer
//! ```
//!
//! # Example
//!
//! ```ignore
//! use contact_engine::{ChartController, EngineConfig, HicSession, HttpMatrixSource};
//!
//! let source = Arc::new(HttpMatrixSource::new("http://localhost:8080", &config)?);
//! let session = Arc::new(HicSession::open(&file_stat, &genome, source, config)?);
//! let chart = ChartController::new(session);
//!
//! chart.open_chromosome_pair("chr1", "chr2").await?;
//! chart.position_from_pixel(260.1, 62.8).await?;
//! if let Some(batch) = chart.load().await? {
//!     // hand batch.cells and batch.domain to the renderer
//! }
//! ```

pub mod chart;
pub mod config;
pub mod fetcher;
pub mod format;
pub mod fragment;
pub mod layout;
pub mod normalizer;
pub mod resolution;
pub mod session;
pub mod types;
pub mod viewport;

// Re-export commonly used types at crate root
pub use chart::{ChartController, ChartSettings};
pub use config::EngineConfig;
pub use fetcher::{
    HttpMatrixSource, InMemoryMatrixSource, MatrixQuery, MatrixResponse, MatrixSource,
};
pub use format::detail::{calculate_coordinates, DetailParams, FragmentAxes};
pub use format::grid::format_data;
pub use fragment::{Fragment, FragmentIndex, FragmentIndexCache, FragmentWindow};
pub use layout::GenomeLayout;
pub use normalizer::{genome_color_domain, sort_data, PairBatch};
pub use resolution::ResolutionSelector;
pub use session::HicSession;
pub use types::{CacheStats, RenderBatch};
pub use viewport::ViewportMapper;

pub use hic_common::{HicError, Result};

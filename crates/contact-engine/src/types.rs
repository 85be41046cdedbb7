//! Output types shared across the engine.

use hic_common::{BinUnit, ColorDomain, PixelCell, ViewState};
use serde::Serialize;

/// Everything the renderer needs for one completed load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderBatch {
    /// Chart generation the batch was produced for.
    pub generation: u64,
    pub view: ViewState,
    /// Bin size the data was fetched at.
    pub resolution: u32,
    pub unit: BinUnit,
    pub cells: Vec<PixelCell>,
    /// `None` when every cell fell below the render threshold.
    pub domain: Option<ColorDomain>,
}

impl RenderBatch {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Bounding box of all cells as `(width, height)` in pixels.
    pub fn extent(&self) -> (f64, f64) {
        self.cells.iter().fold((0.0_f64, 0.0_f64), |(w, h), c| {
            (w.max(c.x + c.width), h.max(c.y + c.height))
        })
    }
}

/// Fragment index cache statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 - 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

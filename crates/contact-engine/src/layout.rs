//! Whole-genome canvas layout.
//!
//! The genome view tiles one block per analyzable chromosome pair. Each
//! chromosome gets a band `ceil(length / resolution) * bin_pixel_size`
//! pixels wide, placed after the bands of the chromosomes before it:
//!
//! ```text
//!          chr1      chr2    chr3 ...
//!        +---------+-------+-----
//!  chr1  | 1 x 1   | 1 x 2 |
//!        +---------+-------+
//!  chr2  | 2 x 1   | 2 x 2 |
//!        +---------+-------+
//! ```
//!
//! Rows and columns share the same offsets.

use std::collections::HashMap;

use hic_common::{ChromosomeIndex, ChromosomeRef, HicError, PixelCell, Result};

#[derive(Debug, Clone, PartialEq)]
struct Band {
    chromosome: ChromosomeRef,
    offset: f64,
    extent: f64,
}

/// Pixel bands of the genome view at one resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct GenomeLayout {
    resolution: u32,
    bin_pixel_size: f64,
    bands: Vec<Band>,
    by_key: HashMap<String, usize>,
}

impl GenomeLayout {
    pub fn new(index: &ChromosomeIndex, resolution: u32, bin_pixel_size: f64) -> Self {
        let resolution_bp = u64::from(resolution.max(1));
        let mut bands = Vec::new();
        let mut by_key = HashMap::new();
        let mut offset = 0.0;

        for chromosome in index.analyzable() {
            let extent = chromosome.length.div_ceil(resolution_bp) as f64 * bin_pixel_size;
            by_key.insert(chromosome.key(), bands.len());
            bands.push(Band {
                chromosome: chromosome.clone(),
                offset,
                extent,
            });
            offset += extent;
        }

        Self {
            resolution,
            bin_pixel_size,
            bands,
            by_key,
        }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn bin_pixel_size(&self) -> f64 {
        self.bin_pixel_size
    }

    /// Chromosomes in layout order.
    pub fn chromosomes(&self) -> impl Iterator<Item = &ChromosomeRef> {
        self.bands.iter().map(|b| &b.chromosome)
    }

    fn band(&self, name: &str) -> Result<&Band> {
        self.by_key
            .get(&name.to_uppercase())
            .map(|&i| &self.bands[i])
            .ok_or_else(|| HicError::UnknownChromosome(name.to_string()))
    }

    /// Pixel origin of a chromosome's band.
    pub fn offset(&self, name: &str) -> Result<f64> {
        Ok(self.band(name)?.offset)
    }

    /// Pixel width of a chromosome's band.
    pub fn extent(&self, name: &str) -> Result<f64> {
        Ok(self.band(name)?.extent)
    }

    /// Width (and height) of the whole canvas.
    pub fn total_extent(&self) -> f64 {
        self.bands.last().map(|b| b.offset + b.extent).unwrap_or(0.0)
    }

    /// Move a pair block's cells to its origin in the genome canvas.
    pub fn offset_cells(&self, x_chr: &str, y_chr: &str, cells: Vec<PixelCell>) -> Result<Vec<PixelCell>> {
        let dx = self.offset(x_chr)?;
        let dy = self.offset(y_chr)?;
        Ok(cells
            .into_iter()
            .map(|c| PixelCell::new(c.x + dx, c.y + dy, c.width, c.height, c.value))
            .collect())
    }

    /// Chromosome under a canvas pixel, with the pixel relative to its band.
    pub fn locate(&self, pixel: f64) -> Option<(&ChromosomeRef, f64)> {
        if !pixel.is_finite() || pixel < 0.0 {
            return None;
        }
        self.bands
            .iter()
            .find(|b| pixel < b.offset + b.extent)
            .map(|b| (&b.chromosome, pixel - b.offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> ChromosomeIndex {
        ChromosomeIndex::new(vec![
            ChromosomeRef::new("chr1", 10_000_000),
            ChromosomeRef::new("chr2", 7_500_001),
            ChromosomeRef::new("chrY", 5_000_000),
            ChromosomeRef::new("chrM", 16_571),
        ])
        .unwrap()
    }

    #[test]
    fn test_offsets_are_cumulative() {
        let layout = GenomeLayout::new(&index(), 2_500_000, 3.0);
        assert_eq!(layout.offset("chr1").unwrap(), 0.0);
        assert_eq!(layout.extent("chr1").unwrap(), 12.0);
        assert_eq!(layout.offset("CHR2").unwrap(), 12.0);
        assert_eq!(layout.extent("chr2").unwrap(), 12.0);
        assert_eq!(layout.total_extent(), 24.0);
        assert!(matches!(layout.offset("chrY"), Err(HicError::UnknownChromosome(_))));
    }

    #[test]
    fn test_offset_cells() {
        let layout = GenomeLayout::new(&index(), 2_500_000, 3.0);
        let cells = vec![PixelCell::new(3.0, 0.0, 3.0, 3.0, 5.0)];
        let moved = layout.offset_cells("chr2", "chr1", cells).unwrap();
        assert_eq!(moved, vec![PixelCell::new(15.0, 0.0, 3.0, 3.0, 5.0)]);
    }

    #[test]
    fn test_locate() {
        let layout = GenomeLayout::new(&index(), 2_500_000, 3.0);
        let (chr, local) = layout.locate(13.5).unwrap();
        assert_eq!(chr.name, "chr2");
        assert_eq!(local, 1.5);
        assert!(layout.locate(24.0).is_none());
        assert!(layout.locate(-1.0).is_none());
    }
}

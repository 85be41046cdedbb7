//! Bin-aligned cells for the genome and chromosome-pair views.

use hic_common::{MatrixTriple, PixelCell};

/// Map bin triples to `bin_pixel_size` square cells.
///
/// `px = floor(x / resolution) * bin_pixel_size`, likewise for `py`.
/// Intra-chromosomal data arrives as one triangle, so each cell is
/// followed by its mirror `(py, px)`. Axis assignment happens upstream
/// (see [`orient_triples`]); the first-axis flag does not change output.
pub fn format_data(
    triples: &[MatrixTriple],
    bin_pixel_size: f64,
    resolution: u32,
    _is_first_axis_x: bool,
    is_intra_chromosomal: bool,
) -> Vec<PixelCell> {
    let resolution = u64::from(resolution.max(1));
    let capacity = if is_intra_chromosomal {
        triples.len() * 2
    } else {
        triples.len()
    };

    let mut cells = Vec::with_capacity(capacity);
    for triple in triples {
        let px = (triple.x / resolution) as f64 * bin_pixel_size;
        let py = (triple.y / resolution) as f64 * bin_pixel_size;
        let cell = PixelCell::new(px, py, bin_pixel_size, bin_pixel_size, triple.value);
        cells.push(cell);
        if is_intra_chromosomal {
            cells.push(cell.transposed());
        }
    }
    cells
}

/// Put the view's X chromosome in each triple's first element.
///
/// Queries name chromosomes in file order; when the view shows them the
/// other way round the triples are transposed before formatting.
pub fn orient_triples(triples: Vec<MatrixTriple>, transpose: bool) -> Vec<MatrixTriple> {
    if transpose {
        triples.iter().map(MatrixTriple::transposed).collect()
    } else {
        triples
    }
}

/// Pixel extent of a chromosome axis at `resolution`.
pub fn axis_extent(length: u64, resolution: u32, bin_pixel_size: f64) -> f64 {
    length.div_ceil(u64::from(resolution.max(1))) as f64 * bin_pixel_size
}

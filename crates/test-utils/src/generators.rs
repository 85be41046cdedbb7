//! Test data generators for synthetic contact matrices.
//!
//! These generators create predictable, verifiable patterns: contact values
//! decay with distance from the diagonal, the way Hi-C signal does.

/// Creates the upper triangle of an intra-chromosomal matrix.
///
/// Bins are `resolution` wide and cover `[0, length)`. Each entry is
/// `(x, y, value)` with `x <= y` and `value = 1000 / (1 + distance_in_bins)`.
///
/// # Example
///
/// ```
/// use test_utils::create_intra_matrix;
///
/// let triples = create_intra_matrix(3_000, 1_000);
/// assert_eq!(triples.len(), 6); // 3 bins -> 3 + 2 + 1 entries
/// assert_eq!(triples[0], (0, 0, 1000.0));
/// ```
pub fn create_intra_matrix(length: u64, resolution: u64) -> Vec<(u64, u64, f64)> {
    let bins = length.div_ceil(resolution);
    let mut triples = Vec::new();
    for i in 0..bins {
        for j in i..bins {
            let value = 1000.0 / (1 + j - i) as f64;
            triples.push((i * resolution, j * resolution, value));
        }
    }
    triples
}

/// Creates a dense inter-chromosomal block with value `col * 10 + row + 1`.
pub fn create_inter_matrix(
    length_x: u64,
    length_y: u64,
    resolution: u64,
) -> Vec<(u64, u64, f64)> {
    let bins_x = length_x.div_ceil(resolution);
    let bins_y = length_y.div_ceil(resolution);
    let mut triples = Vec::with_capacity((bins_x * bins_y) as usize);
    for i in 0..bins_x {
        for j in 0..bins_y {
            triples.push((i * resolution, j * resolution, (i * 10 + j + 1) as f64));
        }
    }
    triples
}

/// Creates evenly spaced restriction cut sites strictly inside `(0, length)`.
///
/// # Example
///
/// ```
/// use test_utils::create_cut_sites;
///
/// assert_eq!(create_cut_sites(1_000, 300), vec![300, 600, 900]);
/// ```
pub fn create_cut_sites(length: u64, spacing: u64) -> Vec<u64> {
    (1..)
        .map(|i| i * spacing)
        .take_while(|&pos| pos < length)
        .collect()
}

/// Creates the upper triangle of a fragment-indexed matrix over `count` fragments.
pub fn create_fragment_matrix(count: u64, resolution: u64) -> Vec<(u64, u64, f64)> {
    let mut triples = Vec::new();
    let mut i = 0;
    while i < count {
        let mut j = i;
        while j < count {
            triples.push((i, j, (100 / (1 + (j - i) / resolution)) as f64));
            j += resolution;
        }
        i += resolution;
    }
    triples
}

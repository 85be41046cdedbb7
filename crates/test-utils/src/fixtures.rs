//! Common test fixtures for contact-matrix tests.
//!
//! Chromosome lengths and sample triples mirror the reference scenarios the
//! engine is calibrated against.

use serde_json::{json, Value};

/// Chromosome lengths used by the reference scenarios.
pub mod genome {
    /// `chr1` as it appears in the scenario fixtures.
    pub const CHR1_LENGTH: u64 = 243_199_373;

    /// `chr2` as it appears in the scenario fixtures (the longer axis).
    pub const CHR2_LENGTH: u64 = 249_250_621;

    pub const CHR3_LENGTH: u64 = 198_022_430;

    pub const CHRX_LENGTH: u64 = 155_270_560;

    pub const CHRY_LENGTH: u64 = 59_373_566;

    pub const CHRM_LENGTH: u64 = 16_571;

    /// A small chromosome for fragment and clamping tests.
    pub const MINI_LENGTH: u64 = 100_000;

    /// `(name, length)` in file order.
    pub const CHROMOSOMES: [(&str, u64); 6] = [
        ("chr1", CHR1_LENGTH),
        ("chr2", CHR2_LENGTH),
        ("chr3", CHR3_LENGTH),
        ("chrX", CHRX_LENGTH),
        ("chrY", CHRY_LENGTH),
        ("chrM", CHRM_LENGTH),
    ];
}

/// Resolution ladders.
pub mod ladders {
    /// The base-pair ladder of the reference scenarios, coarsest first.
    pub const BP: [u32; 9] = [
        2_500_000, 1_000_000, 500_000, 250_000, 100_000, 50_000, 25_000, 10_000, 5_000,
    ];

    /// A typical fragment ladder.
    pub const FRAG: [u32; 8] = [500, 200, 100, 50, 20, 5, 2, 1];
}

/// Sample sparse matrices.
pub mod triples {
    /// Intra-chromosomal sample at 500 kb used by the mirroring scenario.
    pub const INTRA_500KB: [(u64, u64, f64); 4] = [
        (0, 0, 13263.0),
        (0, 500_000, 9454.0),
        (500_000, 50_000, 20787.0),
        (0, 1_000_000, 2562.0),
    ];

    /// Genome-wide batch for the colour-domain scenario:
    /// `(chromosome_x, chromosome_y, [(x, y, value)])`.
    ///
    /// Across chr1/chr2 pairs the extremes are 343 and 116455; the chrM and
    /// chrY batches carry values outside that range.
    pub fn genome_wide_batch() -> Vec<(&'static str, &'static str, Vec<(u64, u64, f64)>)> {
        vec![
            (
                "chr1",
                "chr1",
                vec![(0, 0, 116_455.0), (0, 2_500_000, 40_321.0), (2_500_000, 2_500_000, 98_112.0)],
            ),
            (
                "chr2",
                "chr1",
                vec![(0, 0, 343.0), (2_500_000, 0, 512.0), (5_000_000, 2_500_000, 1_204.0)],
            ),
            (
                "chr2",
                "chr2",
                vec![(0, 0, 101_877.0), (2_500_000, 5_000_000, 37_950.0)],
            ),
            ("chrM", "chr1", vec![(0, 0, 1.0), (0, 2_500_000, 2.0)]),
            ("chrY", "chrY", vec![(0, 0, 999_999.0)]),
        ]
    }
}

/// Genome metadata JSON for the fixture chromosomes.
pub fn genome_metadata_json() -> Value {
    let chromosomes: serde_json::Map<String, Value> = genome::CHROMOSOMES
        .iter()
        .map(|(name, length)| (name.to_string(), json!({ "length": length })))
        .collect();
    json!({ "chromosomes": chromosomes })
}

/// A well-formed file-stat for the fixture genome.
pub fn file_stat_json() -> Value {
    let chromosomes: serde_json::Map<String, Value> = genome::CHROMOSOMES
        .iter()
        .map(|(name, length)| (name.to_string(), json!(length)))
        .collect();
    let order: Vec<&str> = genome::CHROMOSOMES.iter().map(|(name, _)| *name).collect();
    json!({
        "normalizations": ["NONE", "VC", "VC_SQRT", "KR"],
        "chromosomes": chromosomes,
        "chrorder": order,
        "bpResolutions": ladders::BP,
        "fragResolutions": ladders::FRAG,
    })
}

/// A file-stat describing a single small chromosome, for fragment tests.
pub fn mini_file_stat_json() -> Value {
    json!({
        "normalizations": ["NONE"],
        "chromosomes": { "mini": genome::MINI_LENGTH },
        "chrorder": ["mini"],
        "bpResolutions": [10_000, 5_000, 1_000],
        "fragResolutions": [10, 5, 2, 1],
    })
}

/// Genome metadata matching [`mini_file_stat_json`].
pub fn mini_genome_metadata_json() -> Value {
    json!({ "chromosomes": { "mini": { "length": genome::MINI_LENGTH } } })
}

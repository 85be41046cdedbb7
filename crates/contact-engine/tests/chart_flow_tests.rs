//! End-to-end navigation over fixture files: genome → chromosome pair →
//! detail, the way a viewer drives a chart.

use std::sync::Arc;

use contact_engine::{ChartController, EngineConfig, HicSession, InMemoryMatrixSource};
use hic_common::{BinUnit, ColorDomain, GenomicRange, MatrixTriple, ViewState};
use serde_json::json;
use tempfile::TempDir;
use test_utils::{
    assert_approx_eq, create_cut_sites, create_fragment_matrix, file_stat_json, genome,
    genome_metadata_json, mini_file_stat_json, mini_genome_metadata_json,
};

fn write_fixtures(dir: &TempDir) {
    let genome = json!({
        "matrices": [
            { "chromosomeX": "chr1", "chromosomeY": "chr1", "resolution": 2_500_000,
              "items": [[0, 0, 800], [0, 2_500_000, 120]] },
            { "chromosomeX": "chr2", "chromosomeY": "chr1", "resolution": 2_500_000,
              "items": [[0, 0, 40]] }
        ]
    });
    let pair = json!({
        "matrices": [
            { "chromosomeX": "chr1", "chromosomeY": "chr2", "unit": "BP", "resolution": 1_000_000,
              "items": [[0, 3_000_000, 5], [80_000_000, 20_000_000, 11]] },
            { "chromosomeX": "chr1", "chromosomeY": "chr2", "unit": "BP", "resolution": 50_000,
              "items": [[80_000_000, 20_000_000, 12], [1_000_000, 1_000_000, 99], [90_000_000, 15_000_000, null]] }
        ]
    });
    std::fs::write(dir.path().join("genome.json"), genome.to_string()).unwrap();
    std::fs::write(dir.path().join("pair.json"), pair.to_string()).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
}

fn open_chart(dir: &TempDir) -> (ChartController, Arc<InMemoryMatrixSource>) {
    let source = Arc::new(InMemoryMatrixSource::from_fixture_dir(dir.path()).unwrap());
    let session = HicSession::open(
        &file_stat_json(),
        &genome_metadata_json(),
        source.clone(),
        EngineConfig::default(),
    )
    .unwrap();
    (ChartController::new(Arc::new(session)), source)
}

#[tokio::test]
async fn test_genome_to_detail_flow() {
    let dir = TempDir::new().unwrap();
    write_fixtures(&dir);
    let (chart, source) = open_chart(&dir);

    // Genome
    let genome = chart.load().await.unwrap().unwrap();
    assert_eq!(genome.view, ViewState::Genome);
    assert_eq!(genome.domain, Some(ColorDomain::new(40.0, 800.0)));
    assert_eq!(source.request_count(), 10);
    // chr1 x chr2 block and its mirror
    let chr2_offset = 98.0 * 3.0;
    assert!(genome.cells.iter().any(|c| c.xyv() == (0.0, chr2_offset, 40.0)));
    assert!(genome.cells.iter().any(|c| c.xyv() == (chr2_offset, 0.0, 40.0)));

    // Click chr1 (x) against chr2 (y)
    chart.select_from_genome(10.0, 300.0).await.unwrap();
    let pair = chart.load().await.unwrap().unwrap();
    assert_eq!(pair.resolution, 1_000_000);
    assert_eq!(pair.unit, BinUnit::BasePair);
    assert_eq!(pair.cells.len(), 2);
    assert_eq!(pair.cells[1].xyv(), (240.0, 60.0, 11.0));

    // Click into the detail window
    chart.position_from_pixel(260.12890625, 62.7734375).await.unwrap();
    let detail = chart.load().await.unwrap().unwrap();
    assert_eq!(detail.resolution, 50_000);
    // out-of-window bins are not returned; the null value is kept as NaN
    assert_eq!(detail.cells.len(), 2);
    assert_eq!(detail.domain, Some(ColorDomain::new(12.0, 12.0)));

    let cell = detail.cells[0];
    assert_approx_eq!(cell.x, (80_000_000.0 - 76_709_635.0) * 600.0 / 20_000_000.0, 1e-6);
    assert_approx_eq!(cell.y, (20_000_000.0 - 10_924_479.0) * 600.0 / 20_000_000.0, 1e-6);
    assert_eq!(cell.value, 12.0);
    assert!(detail.cells[1].value.is_nan());

    assert_eq!(chart.last_render().await.unwrap().generation, chart.generation());
}

#[tokio::test]
async fn test_missing_matrix_renders_empty() {
    let dir = TempDir::new().unwrap();
    write_fixtures(&dir);
    let (chart, _) = open_chart(&dir);

    chart.open_chromosome_pair("chr3", "chrX").await.unwrap();
    let batch = chart.load().await.unwrap().unwrap();
    assert!(batch.is_empty());
    assert_eq!(batch.domain, None);
}

#[tokio::test]
async fn test_every_navigation_supersedes_the_previous_one() {
    let dir = TempDir::new().unwrap();
    write_fixtures(&dir);
    let (chart, _) = open_chart(&dir);

    let first = chart.open_chromosome_pair("chr1", "chr2").await.unwrap();
    let second = chart.open_chromosome_pair("chr2", "chr1").await.unwrap();
    assert!(second > first);

    let batch = chart.load().await.unwrap().unwrap();
    assert_eq!(batch.generation, second);
    // the second view shows chr1 on Y
    assert_eq!(batch.cells[0].xyv(), (9.0, 0.0, 5.0));
}

#[tokio::test]
async fn test_fragment_detail_flow() {
    let mut source = InMemoryMatrixSource::new()
        .with_sites("mini", "HindIII", create_cut_sites(genome::MINI_LENGTH, 1_000));
    source.insert_matrix(
        "mini",
        "mini",
        BinUnit::Fragment,
        1,
        create_fragment_matrix(100, 1)
            .into_iter()
            .map(MatrixTriple::from)
            .collect(),
    );
    let source = Arc::new(source);
    let session = HicSession::open(
        &mini_file_stat_json(),
        &mini_genome_metadata_json(),
        source.clone(),
        EngineConfig::default(),
    )
    .unwrap();
    let chart = ChartController::new(Arc::new(session));

    let mini = chart.session().chromosome("mini").unwrap().clone();
    let window = GenomicRange::new(&mini, 0, 10_000).unwrap();
    chart
        .navigate(ViewState::Detail {
            x: window.clone(),
            y: window,
        })
        .await
        .unwrap();
    chart
        .set_unit(BinUnit::Fragment, Some("HindIII".to_string()))
        .await
        .unwrap();

    let batch = chart.load().await.unwrap().unwrap();
    // fragments 0..=9: 55 upper-triangle bins, each mirrored
    assert_eq!(batch.cells.len(), 110);
    assert!(batch
        .cells
        .iter()
        .all(|c| c.x >= 0.0 && c.x < 600.0 && c.y >= 0.0 && c.y < 600.0));
    assert_eq!(batch.domain, Some(ColorDomain::new(10.0, 100.0)));

    let stats = chart.session().fragment_cache_stats().await;
    assert_eq!(stats.entries, 1);
    assert_eq!(source.site_request_count(), 1);
}

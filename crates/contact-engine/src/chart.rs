//! Per-chart navigation and the fetch/render cycle.
//!
//! A chart holds one current view. Every navigation action replaces it
//! wholesale and bumps the chart's generation. [`ChartController::load`]
//! snapshots the generation, fetches, and publishes the result only if no
//! navigation happened in the meantime (last navigation wins).
//!
//! ```text
//! navigate ──► generation = 7 ──► load() ─┬─► fetch ... ──► gen == 7? publish
//! navigate ──► generation = 8             │                  gen == 8? drop (Ok(None))
//!                                         └─► error ──► last_render untouched
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use hic_common::{
    BinUnit, ChromosomeRef, ColorDomain, GenomicRange, HicError, MatrixType, NormalizationMethod,
    PixelCell, Result, ViewState,
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::fetcher::MatrixQuery;
use crate::format::detail::{calculate_coordinates, DetailParams, FragmentAxes};
use crate::format::grid::{format_data, orient_triples};
use crate::layout::GenomeLayout;
use crate::normalizer::{genome_color_domain, genome_pairs, sort_data, PairBatch};
use crate::session::HicSession;
use crate::types::RenderBatch;
use crate::viewport::px_per_bp;

/// Display settings that shape queries. Changing any of them is a navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSettings {
    pub normalization: NormalizationMethod,
    pub matrix_type: MatrixType,
    /// Detail-view unit. Genome and chromosome-pair views are always base pairs.
    pub unit: BinUnit,
    /// Restriction enzyme for fragment-unit detail views.
    pub enzyme: Option<String>,
    pub bin_pixel_size: f64,
    pub detail_canvas_px: f64,
}

impl ChartSettings {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            normalization: config.default_normalization.clone(),
            matrix_type: config.default_matrix_type,
            unit: BinUnit::BasePair,
            enzyme: None,
            bin_pixel_size: config.bin_pixel_size,
            detail_canvas_px: config.detail_canvas_px,
        }
    }
}

#[derive(Debug, Clone)]
struct ChartState {
    view: ViewState,
    settings: ChartSettings,
}

/// One chart instance over a shared session.
pub struct ChartController {
    session: Arc<HicSession>,
    generation: AtomicU64,
    state: RwLock<ChartState>,
    last_render: RwLock<Option<Arc<RenderBatch>>>,
}

impl ChartController {
    /// Create a chart showing the whole genome.
    pub fn new(session: Arc<HicSession>) -> Self {
        let settings = ChartSettings::from_config(session.config());
        Self {
            session,
            generation: AtomicU64::new(0),
            state: RwLock::new(ChartState {
                view: ViewState::Genome,
                settings,
            }),
            last_render: RwLock::new(None),
        }
    }

    pub fn session(&self) -> &Arc<HicSession> {
        &self.session
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub async fn current_view(&self) -> ViewState {
        self.state.read().await.view.clone()
    }

    pub async fn settings(&self) -> ChartSettings {
        self.state.read().await.settings.clone()
    }

    /// Most recently published batch.
    pub async fn last_render(&self) -> Option<Arc<RenderBatch>> {
        self.last_render.read().await.clone()
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Replace the current view. Returns the new generation.
    pub async fn navigate(&self, view: ViewState) -> Result<u64> {
        self.check_view(&view)?;
        let mut state = self.state.write().await;
        state.view = view;
        Ok(self.bump(&state))
    }

    pub async fn open_genome(&self) -> u64 {
        let mut state = self.state.write().await;
        state.view = ViewState::Genome;
        self.bump(&state)
    }

    pub async fn open_chromosome_pair(&self, x: &str, y: &str) -> Result<u64> {
        let x = self.session.chromosome(x)?.clone();
        let y = self.session.chromosome(y)?.clone();
        self.navigate(ViewState::ChromosomePair { x, y }).await
    }

    /// Open the chromosome pair under a pixel of the genome view.
    pub async fn select_from_genome(&self, pixel_x: f64, pixel_y: f64) -> Result<u64> {
        let settings = {
            let state = self.state.read().await;
            if state.view != ViewState::Genome {
                return Err(HicError::invalid_parameter(
                    "view",
                    format!("genome selection from {} view", state.view.mode_name()),
                ));
            }
            state.settings.clone()
        };

        let layout = GenomeLayout::new(
            self.session.index(),
            self.session.bp_ladder().coarsest(),
            settings.bin_pixel_size,
        );
        let outside = || {
            HicError::invalid_parameter(
                "pixel",
                format!("({}, {}) is outside the genome", pixel_x, pixel_y),
            )
        };
        let (x, _) = layout.locate(pixel_x).ok_or_else(outside)?;
        let (y, _) = layout.locate(pixel_y).ok_or_else(outside)?;

        let view = ViewState::ChromosomePair {
            x: x.clone(),
            y: y.clone(),
        };
        self.navigate(view).await
    }

    /// Open the detail window around a pixel of the chromosome-pair view.
    pub async fn position_from_pixel(&self, pixel_x: f64, pixel_y: f64) -> Result<u64> {
        let mut state = self.state.write().await;
        let (x, y) = match &state.view {
            ViewState::ChromosomePair { x, y } => (x.clone(), y.clone()),
            other => {
                return Err(HicError::invalid_parameter(
                    "view",
                    format!("pixel selection from {} view", other.mode_name()),
                ))
            }
        };

        let (range_x, range_y) = self.session.mapper().position_from_pixel(
            pixel_x,
            pixel_y,
            state.settings.bin_pixel_size,
            &x,
            &y,
            self.session.bp_ladder(),
        )?;

        info!(x = %range_x, y = %range_y, "Opening detail view");
        state.view = ViewState::Detail {
            x: range_x,
            y: range_y,
        };
        Ok(self.bump(&state))
    }

    /// Shift the detail view by a pixel delta.
    pub async fn pan(&self, dx_px: f64, dy_px: f64) -> Result<u64> {
        let mapper = self.session.mapper();
        self.update_detail(|settings, x, y, chr_x, chr_y| {
            let delta_x = (dx_px / px_per_bp(x, settings.detail_canvas_px)).round() as i64;
            let delta_y = (dy_px / px_per_bp(y, settings.detail_canvas_px)).round() as i64;
            Ok((
                mapper.pan(x, chr_x, delta_x)?,
                mapper.pan(y, chr_y, delta_y)?,
            ))
        })
        .await
    }

    /// Zoom the detail view around a focus point (fractions of the canvas).
    pub async fn zoom(&self, factor: f64, focus_x: f64, focus_y: f64) -> Result<u64> {
        let mapper = self.session.mapper();
        let ladder = self.session.bp_ladder();
        self.update_detail(|_, x, y, chr_x, chr_y| {
            Ok((
                mapper.zoom(x, chr_x, factor, focus_x, ladder)?,
                mapper.zoom(y, chr_y, factor, focus_y, ladder)?,
            ))
        })
        .await
    }

    pub async fn set_normalization(&self, method: NormalizationMethod) -> Result<u64> {
        if !self.session.catalog().supports_normalization(&method) {
            return Err(HicError::invalid_parameter(
                "normalization",
                format!("{} is not available in this file", method),
            ));
        }
        let mut state = self.state.write().await;
        state.settings.normalization = method;
        Ok(self.bump(&state))
    }

    pub async fn set_matrix_type(&self, matrix_type: MatrixType) -> u64 {
        let mut state = self.state.write().await;
        state.settings.matrix_type = matrix_type;
        self.bump(&state)
    }

    /// Switch the detail unit. Fragment units need an enzyme and a fragment ladder.
    pub async fn set_unit(&self, unit: BinUnit, enzyme: Option<String>) -> Result<u64> {
        if unit == BinUnit::Fragment {
            self.session.fragment_ladder()?;
            if enzyme.is_none() {
                return Err(HicError::invalid_parameter(
                    "enzyme",
                    "fragment unit requires a restriction enzyme",
                ));
            }
        }
        let mut state = self.state.write().await;
        state.settings.unit = unit;
        state.settings.enzyme = enzyme;
        Ok(self.bump(&state))
    }

    fn bump(&self, state: &ChartState) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, view = %state.view, "Navigated");
        generation
    }

    fn check_view(&self, view: &ViewState) -> Result<()> {
        let index = self.session.index();
        match view {
            ViewState::Genome => Ok(()),
            ViewState::ChromosomePair { x, y } => {
                index.get(&x.name)?;
                index.get(&y.name)?;
                Ok(())
            }
            ViewState::Detail { x, y } => {
                for range in [x, y] {
                    let chr = index.get(&range.chr)?;
                    GenomicRange::new(chr, range.start, range.stop)?;
                }
                Ok(())
            }
        }
    }

    async fn update_detail<F>(&self, update: F) -> Result<u64>
    where
        F: FnOnce(
            &ChartSettings,
            &GenomicRange,
            &GenomicRange,
            &ChromosomeRef,
            &ChromosomeRef,
        ) -> Result<(GenomicRange, GenomicRange)>,
    {
        let mut state = self.state.write().await;
        let (x, y) = match &state.view {
            ViewState::Detail { x, y } => (x.clone(), y.clone()),
            other => {
                return Err(HicError::invalid_parameter(
                    "view",
                    format!("detail navigation from {} view", other.mode_name()),
                ))
            }
        };
        let chr_x = self.session.chromosome(&x.chr)?;
        let chr_y = self.session.chromosome(&y.chr)?;

        let (x, y) = update(&state.settings, &x, &y, chr_x, chr_y)?;
        state.view = ViewState::Detail { x, y };
        Ok(self.bump(&state))
    }

    // ========================================================================
    // Fetch / render
    // ========================================================================

    /// Run one fetch/render cycle for the current view.
    ///
    /// Returns `Ok(None)` when a navigation superseded the cycle before it
    /// finished. Query errors are returned and leave the last render in place.
    pub async fn load(&self) -> Result<Option<Arc<RenderBatch>>> {
        let (generation, state) = {
            let state = self.state.read().await;
            (self.generation(), state.clone())
        };

        let result = match &state.view {
            ViewState::Genome => self.render_genome(&state.settings).await,
            ViewState::ChromosomePair { x, y } => self.render_pair(&state.settings, x, y).await,
            ViewState::Detail { x, y } => match state.settings.unit {
                BinUnit::BasePair => self.render_detail(&state.settings, x, y).await,
                BinUnit::Fragment => self.render_fragments(&state.settings, x, y).await,
            },
        };

        let rendered = match result {
            Ok(rendered) => rendered,
            Err(e) if self.generation() != generation => {
                debug!(generation, error = %e, "Discarding failed stale load");
                return Ok(None);
            }
            Err(e) => {
                warn!(generation, view = %state.view, error = %e, "Load failed; keeping previous render");
                return Err(e);
            }
        };

        // Generations only advance under the state write lock, so holding the
        // read guard keeps the check valid until the batch is stored.
        let _state = self.state.read().await;
        let mut last = self.last_render.write().await;
        if self.generation() != generation {
            debug!(
                generation,
                current = self.generation(),
                "Discarding stale load"
            );
            return Ok(None);
        }

        let batch = Arc::new(RenderBatch {
            generation,
            view: state.view,
            resolution: rendered.resolution,
            unit: rendered.unit,
            cells: rendered.cells,
            domain: rendered.domain,
        });
        debug!(
            generation,
            cells = batch.cells.len(),
            resolution = batch.resolution,
            "Published render batch"
        );
        *last = Some(batch.clone());
        Ok(Some(batch))
    }

    /// Whether the query for `(x, y)` must name `y` first to follow file order.
    fn swapped(&self, x: &str, y: &str) -> bool {
        let index = self.session.index();
        index.position(x) > index.position(y)
    }

    async fn render_genome(&self, settings: &ChartSettings) -> Result<Rendered> {
        let resolution = self.session.bp_ladder().coarsest();
        let pairs = genome_pairs(self.session.index());

        let session = self.session.clone();
        let fetches = pairs
            .into_iter()
            .map(move |(x, y)| fetch_genome_block(session.clone(), x.name, y.name, resolution));
        let batches: Vec<PairBatch> = stream::iter(fetches)
            .buffered(self.session.config().genome_fetch_concurrency)
            .try_collect()
            .await?;

        let layout = GenomeLayout::new(self.session.index(), resolution, settings.bin_pixel_size);
        let mut cells = Vec::new();
        for batch in &batches {
            let intra = batch.chromosome_x.eq_ignore_ascii_case(&batch.chromosome_y);
            let block = format_data(&batch.triples, settings.bin_pixel_size, resolution, true, intra);
            cells.extend(layout.offset_cells(&batch.chromosome_x, &batch.chromosome_y, block)?);

            if !intra {
                let mirrored = orient_triples(batch.triples.clone(), true);
                let block = format_data(&mirrored, settings.bin_pixel_size, resolution, true, false);
                cells.extend(layout.offset_cells(&batch.chromosome_y, &batch.chromosome_x, block)?);
            }
        }

        Ok(Rendered {
            resolution,
            unit: BinUnit::BasePair,
            cells,
            domain: genome_color_domain(&batches),
        })
    }

    async fn render_pair(
        &self,
        settings: &ChartSettings,
        x: &ChromosomeRef,
        y: &ChromosomeRef,
    ) -> Result<Rendered> {
        let resolution = self
            .session
            .selector()
            .chromosome_pair_resolution(self.session.bp_ladder(), x, y);
        let swapped = self.swapped(&x.name, &y.name);
        let (first, second) = if swapped { (y, x) } else { (x, y) };

        let query = MatrixQuery::ChromosomePair {
            chromosome_x: first.name.clone(),
            chromosome_y: second.name.clone(),
            resolution,
            normalization: settings.normalization.clone(),
            matrix_type: settings.matrix_type,
        };
        let response = self.session.fetch(&query).await?;

        let triples = orient_triples(response.items, swapped);
        let cells = format_data(
            &triples,
            settings.bin_pixel_size,
            resolution,
            !swapped,
            query.is_intra_chromosomal(),
        );

        Ok(Rendered {
            resolution,
            unit: BinUnit::BasePair,
            domain: sort_data(&triples),
            cells,
        })
    }

    async fn render_detail(
        &self,
        settings: &ChartSettings,
        x: &GenomicRange,
        y: &GenomicRange,
    ) -> Result<Rendered> {
        let resolution = self
            .session
            .selector()
            .detail_resolution(self.session.bp_ladder(), x, y);
        let swapped = self.swapped(&x.chr, &y.chr);
        let (first, second) = if swapped { (y, x) } else { (x, y) };

        let query = MatrixQuery::Detail {
            x: first.clone(),
            y: second.clone(),
            resolution,
            normalization: settings.normalization.clone(),
            matrix_type: settings.matrix_type,
        };
        let response = self.session.fetch(&query).await?;

        let params = detail_params(settings, x, y, resolution, swapped, BinUnit::BasePair);
        let cells = calculate_coordinates(&params, &response.items, None)?;

        Ok(Rendered {
            resolution,
            unit: BinUnit::BasePair,
            domain: sort_data(&response.items),
            cells,
        })
    }

    async fn render_fragments(
        &self,
        settings: &ChartSettings,
        x: &GenomicRange,
        y: &GenomicRange,
    ) -> Result<Rendered> {
        let enzyme = settings.enzyme.as_deref().ok_or_else(|| {
            HicError::invalid_parameter("enzyme", "fragment unit requires a restriction enzyme")
        })?;
        let ladder = self.session.fragment_ladder()?;

        let axes = FragmentAxes {
            x: self.session.fragment_index(&x.chr, enzyme).await?,
            y: self.session.fragment_index(&y.chr, enzyme).await?,
        };
        let window_x = axes.x.window(x)?;
        let window_y = axes.y.window(y)?;
        let resolution = self
            .session
            .selector()
            .fragment_resolution(ladder, window_x.len().max(window_y.len()));

        let swapped = self.swapped(&x.chr, &y.chr);
        let (first, second) = if swapped {
            ((&y.chr, window_y), (&x.chr, window_x))
        } else {
            ((&x.chr, window_x), (&y.chr, window_y))
        };

        let query = MatrixQuery::Fragment {
            chromosome_x: first.0.clone(),
            chromosome_y: second.0.clone(),
            x: first.1,
            y: second.1,
            resolution,
            normalization: settings.normalization.clone(),
            matrix_type: settings.matrix_type,
        };
        let response = self.session.fetch(&query).await?;

        let params = detail_params(settings, x, y, resolution, swapped, BinUnit::Fragment);
        let cells = calculate_coordinates(&params, &response.items, Some(&axes))?;

        Ok(Rendered {
            resolution,
            unit: BinUnit::Fragment,
            domain: sort_data(&response.items),
            cells,
        })
    }
}

/// Output of one render before it is stamped with a generation.
struct Rendered {
    resolution: u32,
    unit: BinUnit,
    cells: Vec<PixelCell>,
    domain: Option<ColorDomain>,
}

fn detail_params(
    settings: &ChartSettings,
    x: &GenomicRange,
    y: &GenomicRange,
    resolution: u32,
    swapped: bool,
    unit: BinUnit,
) -> DetailParams {
    DetailParams {
        // The query's first chromosome is the view's Y axis when swapped.
        is_first_axis_x: swapped,
        is_intra_chromosomal: x.same_chromosome(y),
        px_per_bp_x: px_per_bp(x, settings.detail_canvas_px),
        px_per_bp_y: px_per_bp(y, settings.detail_canvas_px),
        resolution,
        range_x: x.clone(),
        range_y: y.clone(),
        unit,
    }
}

/// One block of the genome view. Owns its inputs so the fan-out stream stays `Send`.
async fn fetch_genome_block(
    session: Arc<HicSession>,
    chromosome_x: String,
    chromosome_y: String,
    resolution: u32,
) -> Result<PairBatch> {
    let query = MatrixQuery::Genome {
        chromosome_x: chromosome_x.clone(),
        chromosome_y: chromosome_y.clone(),
        resolution,
    };
    let response = session.fetch(&query).await?;
    Ok(PairBatch::new(chromosome_x, chromosome_y, response.items))
}

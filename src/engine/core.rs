use std::collections::HashMap;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::analysis::{ChartNotice, ChartSeriesBuilder};
use crate::config::{ChartType, DF, DisplayMode, constants::MAX_INSTRUMENTS};
use crate::data::{InstrumentHistory, UserSettingsStore};
use crate::domain::{ChartError, InstrumentSelection};
use crate::models::{
    ChartLayout, ConversionPath, CrossRateGraph, CurrencyNormalizer, IndicatorKind,
    IndicatorOverlayRegistry, IndicatorParams, IndicatorSource, LoadedInstrumentSeries,
    RenderSurface, ToggleOutcome, gap_interpolator::fill_gaps,
};
use crate::utils::TimeUtils;

use super::messages::{FetchReason, FetchRequest, FetchResponse, FetchTicket};
use super::state::{ChartSettings, InstrumentSettings};

/// What a session operation did.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// The surface was rebuilt from data already held.
    Replotted,
    /// Nothing to redraw (no change, or nothing loaded yet).
    Unchanged,
    /// Fulfil this and pass the answer to `ChartSession::apply_response`.
    Fetch(FetchRequest),
    /// A response for a superseded request was dropped.
    Stale,
}

/// One price chart: selection, loaded data, rate cache, indicator
/// bookkeeping and the surface everything is drawn on.
pub struct ChartSession<S: RenderSurface> {
    surface: S,
    store: Box<dyn UserSettingsStore>,
    settings: ChartSettings,
    selections: Vec<InstrumentSelection>,
    loaded: Vec<LoadedInstrumentSeries>,
    /// `from` of the fetch that produced `loaded`.
    loaded_from: Option<String>,
    graph: CrossRateGraph,
    main_currency: String,
    registry: IndicatorOverlayRegistry,
    /// Annotations of the primary instrument, persisted with its settings.
    shapes: Vec<Value>,
    layout: ChartLayout,
    notices: Vec<ChartNotice>,

    next_ticket: u64,
    pending: Option<FetchRequest>,
    stale_responses: usize,
}

impl<S: RenderSurface> ChartSession<S> {
    pub fn new(surface: S, store: Box<dyn UserSettingsStore>) -> Self {
        Self {
            surface,
            store,
            settings: ChartSettings::default(),
            selections: Vec::new(),
            loaded: Vec::new(),
            loaded_from: None,
            graph: CrossRateGraph::new(),
            main_currency: String::new(),
            registry: IndicatorOverlayRegistry::new(),
            shapes: Vec::new(),
            layout: ChartLayout::default(),
            notices: Vec::new(),
            next_ticket: 0,
            pending: None,
            stale_responses: 0,
        }
    }

    // --- Accessors ---

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn settings(&self) -> &ChartSettings {
        &self.settings
    }

    pub fn selections(&self) -> &[InstrumentSelection] {
        &self.selections
    }

    pub fn loaded(&self) -> &[LoadedInstrumentSeries] {
        &self.loaded
    }

    pub fn graph(&self) -> &CrossRateGraph {
        &self.graph
    }

    pub fn main_currency(&self) -> &str {
        &self.main_currency
    }

    pub fn registry(&self) -> &IndicatorOverlayRegistry {
        &self.registry
    }

    pub fn layout(&self) -> &ChartLayout {
        &self.layout
    }

    pub fn shapes(&self) -> &[Value] {
        &self.shapes
    }

    /// Notices from the most recent replot.
    pub fn notices(&self) -> &[ChartNotice] {
        &self.notices
    }

    pub fn pending(&self) -> Option<&FetchRequest> {
        self.pending.as_ref()
    }

    pub fn stale_responses(&self) -> usize {
        self.stale_responses
    }

    // --- Exposed operations ---

    /// Replaces the instrument selection. Drops loaded data and the rate
    /// cache, resets indicators and asks for a fresh fetch.
    pub fn prepare_chart(&mut self, selections: Vec<InstrumentSelection>) -> Result<FetchRequest> {
        if selections.is_empty() {
            return Err(ChartError::NoInstruments.into());
        }
        if selections.len() > MAX_INSTRUMENTS {
            return Err(ChartError::TooManyInstruments {
                requested: selections.len(),
                max: MAX_INSTRUMENTS,
            }
            .into());
        }

        log::info!(
            "Preparing chart for {:?}",
            selections.iter().map(|s| s.instrument_id.as_str()).collect::<Vec<_>>()
        );

        self.selections = selections;
        self.loaded.clear();
        self.loaded_from = None;
        self.graph.clear();
        self.main_currency.clear();
        self.notices.clear();
        self.registry.reset();
        self.shapes.clear();
        self.registry
            .set_multi_instrument(self.selections.len() > 1, &mut self.surface);
        self.restore_instrument_settings();

        Ok(self.issue(FetchReason::PrepareChart))
    }

    /// Switches the display currency. Replots straight away when the rate
    /// cache already joins every instrument to `code`; fetches otherwise.
    /// A pending instrument reload is re-issued with the new currency.
    pub fn set_display_currency(&mut self, code: &str) -> SessionUpdate {
        let code = code.trim().to_uppercase();
        let requested = (!code.is_empty()).then_some(code);
        if self.settings.display_currency == requested {
            return SessionUpdate::Unchanged;
        }
        self.settings.display_currency = requested;

        if self.loaded.is_empty() {
            return self.reissue_pending();
        }

        let missing_edge = self.settings.display_currency.as_deref().is_some_and(|display| {
            let normalizer = CurrencyNormalizer::new(&self.graph, &self.main_currency);
            self.loaded
                .iter()
                .any(|s| normalizer.plan(&s.instrument.currency, display) == ConversionPath::Unconverted)
        });

        if let Some(reason) = self.pending.as_ref().filter(|p| p.wants_instruments()).map(|p| p.reason) {
            // an instrument reload is in flight; widen it rather than replace it
            SessionUpdate::Fetch(self.issue(reason))
        } else if missing_edge {
            SessionUpdate::Fetch(self.issue(FetchReason::DisplayCurrency))
        } else {
            self.replot();
            SessionUpdate::Replotted
        }
    }

    /// Moves the window start (`None` = full history). Fetches only when the
    /// new start lies before the loaded data.
    pub fn set_window_start(&mut self, date: Option<&str>) -> Result<SessionUpdate> {
        let start = date.map(TimeUtils::normalize_date_key).transpose()?;
        if self.settings.window_start == start {
            return Ok(SessionUpdate::Unchanged);
        }
        self.settings.window_start = start;

        if self.loaded.is_empty() {
            return Ok(self.reissue_pending());
        }

        let needs_earlier_data = match (&self.loaded_from, &self.settings.window_start) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(loaded_from), Some(start)) => start < loaded_from,
        };

        if needs_earlier_data {
            Ok(SessionUpdate::Fetch(self.issue(FetchReason::WindowExtension)))
        } else {
            self.replot();
            Ok(SessionUpdate::Replotted)
        }
    }

    /// Shows or hides one indicator against the current window.
    pub fn toggle_indicator(&mut self, kind: IndicatorKind) -> ToggleOutcome {
        let source = self.indicator_source();
        let outcome = self.registry.toggle(kind, &source, &mut self.surface);
        self.sync_oscillator_subplot();
        log::info!("Toggle {}: {:?}", kind, outcome);
        outcome
    }

    pub fn set_chart_type(&mut self, chart_type: ChartType) -> SessionUpdate {
        if self.settings.chart_type == chart_type {
            return SessionUpdate::Unchanged;
        }
        self.settings.chart_type = chart_type;
        self.persist_instrument_settings();
        self.replot_if_loaded()
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) -> SessionUpdate {
        if self.settings.display_mode == mode {
            return SessionUpdate::Unchanged;
        }
        self.settings.display_mode = mode;
        self.replot_if_loaded()
    }

    /// Replaces the chart annotations and saves them for the primary instrument.
    pub fn set_shapes(&mut self, shapes: Vec<Value>) {
        self.shapes = shapes;
        self.persist_instrument_settings();
        self.layout.shapes = self.shapes.clone();
        if !self.loaded.is_empty() {
            self.surface.relayout(&self.layout);
        }
    }

    /// Stores new parameters for `kind` and re-derives it if shown.
    pub fn set_indicator_params(&mut self, kind: IndicatorKind, params: IndicatorParams) -> ToggleOutcome {
        self.registry.set_params(kind, params);
        self.persist_instrument_settings();

        if !self.registry.is_shown(kind) {
            return ToggleOutcome::Unchanged;
        }
        let source = self.indicator_source();
        self.registry.hide(kind, &mut self.surface);
        let outcome = self.registry.show(kind, &source, &mut self.surface);
        self.sync_oscillator_subplot();
        outcome
    }

    /// Applies the answer to a fetch. Answers to anything but the latest
    /// request are counted and dropped.
    pub fn apply_response(&mut self, ticket: FetchTicket, response: FetchResponse) -> Result<SessionUpdate> {
        let Some(request) = self.pending.take_if(|p| p.ticket == ticket) else {
            self.stale_responses += 1;
            if DF.log_stale_responses {
                log::info!(
                    "Dropping stale response {} (current: {:?})",
                    ticket,
                    self.pending.as_ref().map(|p| p.ticket)
                );
            }
            return Ok(SessionUpdate::Stale);
        };

        match request.reason {
            FetchReason::PrepareChart | FetchReason::WindowExtension => {
                let loaded = self.assemble(response.instruments)?;
                let graph = CrossRateGraph::from_edges(response.rates.edges)
                    .context("Cross rate response rejected")?;
                self.loaded = loaded;
                self.graph = graph;
                self.main_currency = response.rates.main_currency;
                self.loaded_from = request.from;
            }
            FetchReason::DisplayCurrency => {
                for edge in response.rates.edges {
                    self.graph.upsert(edge).context("Cross rate response rejected")?;
                }
                if !response.rates.main_currency.is_empty() {
                    self.main_currency = response.rates.main_currency;
                }
            }
        }

        self.replot();
        Ok(SessionUpdate::Replotted)
    }

    // --- Internals ---

    fn issue(&mut self, reason: FetchReason) -> FetchRequest {
        self.next_ticket += 1;
        let instrument_ids = match reason {
            FetchReason::PrepareChart | FetchReason::WindowExtension => {
                self.selections.iter().map(|s| s.instrument_id.clone()).collect()
            }
            FetchReason::DisplayCurrency => Vec::new(),
        };

        let mut currencies: Vec<String> = self.settings.display_currency.iter().cloned().collect();
        if reason == FetchReason::DisplayCurrency {
            for series in &self.loaded {
                if !currencies.contains(&series.instrument.currency) {
                    currencies.push(series.instrument.currency.clone());
                }
            }
        }

        // rate-only fetches must cover everything already loaded
        let from = match reason {
            FetchReason::DisplayCurrency => self.loaded_from.clone(),
            _ => self.settings.window_start.clone(),
        };

        let request = FetchRequest {
            ticket: FetchTicket(self.next_ticket),
            reason,
            instrument_ids,
            currencies,
            from,
        };

        if let Some(superseded) = self.pending.replace(request.clone()) {
            log::debug!("Fetch {} superseded by {}", superseded.ticket, request.ticket);
        }
        request
    }

    /// Settings changed while the first load is in flight: ask again so the
    /// answer matches them.
    fn reissue_pending(&mut self) -> SessionUpdate {
        match self.pending.as_ref().map(|p| p.reason) {
            Some(reason) => SessionUpdate::Fetch(self.issue(reason)),
            None => SessionUpdate::Unchanged,
        }
    }

    /// Loaded series in selection order.
    fn assemble(&self, histories: Vec<InstrumentHistory>) -> Result<Vec<LoadedInstrumentSeries>> {
        let mut by_id: HashMap<String, InstrumentHistory> = histories
            .into_iter()
            .map(|h| (h.info.id.clone(), h))
            .collect();

        self.selections
            .iter()
            .map(|selection| {
                let history = by_id
                    .remove(&selection.instrument_id)
                    .ok_or_else(|| ChartError::UnknownInstrument(selection.instrument_id.clone()))?;
                if history.prices.is_empty() {
                    log::warn!("{}: data source returned no prices", history.info.id);
                }
                let transactions = if selection.show_transactions {
                    history.transactions
                } else {
                    Vec::new()
                };
                Ok(LoadedInstrumentSeries::new(
                    history.info,
                    history.prices,
                    history.ohlc,
                    transactions,
                ))
            })
            .collect()
    }

    fn replot_if_loaded(&mut self) -> SessionUpdate {
        if self.loaded.is_empty() {
            return SessionUpdate::Unchanged;
        }
        self.replot();
        SessionUpdate::Replotted
    }

    /// Full rebuild: renormalize, rewindow, render base traces, then re-derive
    /// every shown indicator against the new window.
    fn replot(&mut self) {
        crate::trace_time!("replot", 2_000, {
            let normalizer = CurrencyNormalizer::new(&self.graph, &self.main_currency);
            for series in self.loaded.iter_mut() {
                let display = self
                    .settings
                    .display_currency
                    .clone()
                    .unwrap_or_else(|| series.instrument.currency.clone());
                series.renormalize(&normalizer, &display);
                series.set_window(self.settings.window_start.as_deref(), self.settings.display_mode);
            }

            let built = ChartSeriesBuilder::new(&self.loaded)
                .chart_type(self.settings.chart_type)
                .mode(self.settings.display_mode)
                .requested_currency(self.settings.display_currency.as_deref().unwrap_or_default())
                .build();

            let mut layout = built.layout;
            layout.oscillator_subplot = self.registry.needs_oscillator_subplot();
            layout.shapes = self.shapes.clone();

            self.registry.invalidate();
            self.surface.render(built.traces, &layout);
            let source = self.indicator_source();
            self.registry.reattach(&source, &mut self.surface);

            self.layout = layout;
            self.notices = built.notices;
        });

        log::info!(
            "Replotted {} instruments: {} traces, {} notices",
            self.loaded.len(),
            self.surface.trace_count(),
            self.notices.len()
        );
    }

    /// Gap-filled, display-scaled closes of the first instrument with a
    /// non-empty window.
    fn indicator_source(&self) -> IndicatorSource {
        let Some(primary) = self.loaded.iter().find(|s| !s.window().is_empty()) else {
            return IndicatorSource::default();
        };
        let window = primary.window();
        IndicatorSource {
            dates: window.iter().map(|p| p.date.clone()).collect(),
            closes: fill_gaps(window)
                .into_iter()
                .map(|v| primary.factor.apply(v))
                .collect(),
        }
    }

    fn sync_oscillator_subplot(&mut self) {
        let needed = self.registry.needs_oscillator_subplot();
        if self.layout.oscillator_subplot != needed {
            self.layout.oscillator_subplot = needed;
            self.surface.relayout(&self.layout);
        }
    }

    fn primary_id(&self) -> Option<&str> {
        self.selections.first().map(|s| s.instrument_id.as_str())
    }

    fn restore_instrument_settings(&mut self) {
        let Some(id) = self.primary_id().map(str::to_string) else {
            return;
        };
        let stored = match self.store.load(&id) {
            Ok(Some(value)) => value,
            Ok(None) => return,
            Err(e) => {
                log::warn!("Failed to load chart settings for {}: {:#}", id, e);
                return;
            }
        };
        match serde_json::from_value::<InstrumentSettings>(stored) {
            Ok(saved) => {
                saved.apply_to(&mut self.registry);
                if let Some(chart_type) = saved.chart_type {
                    self.settings.chart_type = chart_type;
                }
                self.shapes = saved.shapes;
            }
            Err(e) => log::warn!("Ignoring unreadable chart settings for {}: {}", id, e),
        }
    }

    fn persist_instrument_settings(&mut self) {
        let Some(id) = self.primary_id().map(str::to_string) else {
            return;
        };
        let saved = InstrumentSettings::capture(&self.registry, self.settings.chart_type, &self.shapes);
        let result = serde_json::to_value(&saved)
            .map_err(anyhow::Error::from)
            .and_then(|value| self.store.save(&id, value));
        if let Err(e) = result {
            log::warn!("Failed to save chart settings for {}: {:#}", id, e);
        }
    }
}

use std::collections::HashMap;

use strum::IntoEnumIterator;

use crate::config::{DF, plot::CHART_CONFIG};
use crate::models::indicators::{IndicatorKind, IndicatorParams, derive_lines};
use crate::models::surface::RenderSurface;
use crate::models::traces::{LineShape, LineTrace, Trace};

/// Render bookkeeping for one indicator kind.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorState {
    pub kind: IndicatorKind,
    pub is_oscillator: bool,
    pub shown: bool,
    /// Positions of this indicator's traces on the surface. Empty while hidden
    /// and between a replot and the following reattach.
    pub trace_indices: Vec<usize>,
}

impl IndicatorState {
    fn hidden(kind: IndicatorKind) -> Self {
        Self {
            kind,
            is_oscillator: kind.is_oscillator(),
            shown: false,
            trace_indices: Vec::new(),
        }
    }
}

/// Window the indicators are derived against: dates plus gap-free closes,
/// already in display currency and display scale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSource {
    pub dates: Vec<String>,
    pub closes: Vec<f64>,
}

impl IndicatorSource {
    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefusalReason {
    /// Oscillators are only available while one instrument is plotted.
    MultiInstrumentMode,
    /// Nothing to derive from.
    NoData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Traces added at these positions.
    Shown(Vec<usize>),
    Hidden,
    Refused(RefusalReason),
    /// Already in the requested state.
    Unchanged,
}

/// Which indicators are rendered and where their traces sit.
#[derive(Debug, Clone)]
pub struct IndicatorOverlayRegistry {
    states: Vec<IndicatorState>,
    params: HashMap<IndicatorKind, IndicatorParams>,
    multi_instrument: bool,
}

impl Default for IndicatorOverlayRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorOverlayRegistry {
    /// Every known kind, hidden.
    pub fn new() -> Self {
        Self {
            states: IndicatorKind::iter().map(IndicatorState::hidden).collect(),
            params: HashMap::new(),
            multi_instrument: false,
        }
    }

    pub fn states(&self) -> &[IndicatorState] {
        &self.states
    }

    pub fn state(&self, kind: IndicatorKind) -> &IndicatorState {
        // `new` creates one state per kind, so the lookup always hits
        &self.states[Self::slot(kind)]
    }

    pub fn is_shown(&self, kind: IndicatorKind) -> bool {
        self.state(kind).shown
    }

    pub fn shown_kinds(&self) -> Vec<IndicatorKind> {
        self.states.iter().filter(|s| s.shown).map(|s| s.kind).collect()
    }

    /// True while any oscillator is shown; the layout must reserve its subplot.
    pub fn needs_oscillator_subplot(&self) -> bool {
        self.states.iter().any(|s| s.shown && s.is_oscillator)
    }

    pub fn params(&self, kind: IndicatorKind) -> IndicatorParams {
        self.params
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| IndicatorParams::default_for(kind))
    }

    pub fn set_params(&mut self, kind: IndicatorKind, params: IndicatorParams) {
        self.params.insert(kind, params);
    }

    pub fn is_multi_instrument(&self) -> bool {
        self.multi_instrument
    }

    /// Derives `kind` from `source`, adds its traces and records their positions.
    pub fn show<S: RenderSurface + ?Sized>(
        &mut self,
        kind: IndicatorKind,
        source: &IndicatorSource,
        surface: &mut S,
    ) -> ToggleOutcome {
        let slot = Self::slot(kind);
        if self.states[slot].shown {
            return ToggleOutcome::Unchanged;
        }
        if kind.is_oscillator() && self.multi_instrument {
            log::warn!("{} refused: oscillators need a single-instrument chart", kind);
            return ToggleOutcome::Refused(RefusalReason::MultiInstrumentMode);
        }
        if source.is_empty() {
            return ToggleOutcome::Refused(RefusalReason::NoData);
        }

        let indices = self.attach(kind, source, surface);
        let state = &mut self.states[slot];
        state.shown = true;
        state.trace_indices = indices.clone();
        ToggleOutcome::Shown(indices)
    }

    /// Removes `kind`'s traces and shifts every other recorded position down
    /// once per removed position below it.
    pub fn hide<S: RenderSurface + ?Sized>(&mut self, kind: IndicatorKind, surface: &mut S) -> ToggleOutcome {
        let slot = Self::slot(kind);
        if !self.states[slot].shown {
            return ToggleOutcome::Unchanged;
        }

        let mut removed = std::mem::take(&mut self.states[slot].trace_indices);
        self.states[slot].shown = false;
        if removed.is_empty() {
            return ToggleOutcome::Hidden;
        }

        removed.sort_unstable();
        removed.dedup();
        surface.remove_traces(&removed);

        for state in self.states.iter_mut() {
            if !state.trace_indices.is_empty() {
                state.trace_indices = shift_indices(&state.trace_indices, &removed);
            }
        }

        if DF.log_registry {
            log::debug!("hide {}: removed {:?}, now {:?}", kind, removed, self.index_map());
        }
        ToggleOutcome::Hidden
    }

    pub fn toggle<S: RenderSurface + ?Sized>(
        &mut self,
        kind: IndicatorKind,
        source: &IndicatorSource,
        surface: &mut S,
    ) -> ToggleOutcome {
        if self.is_shown(kind) {
            self.hide(kind, surface)
        } else {
            self.show(kind, source, surface)
        }
    }

    /// A full rebuild dropped every trace: forget all positions, keep the shown flags.
    pub fn invalidate(&mut self) {
        for state in self.states.iter_mut() {
            state.trace_indices.clear();
        }
    }

    /// Re-derives every shown indicator against a new window, appending in kind order.
    /// Call after `invalidate` and the base traces have been rendered.
    pub fn reattach<S: RenderSurface + ?Sized>(&mut self, source: &IndicatorSource, surface: &mut S) {
        for slot in 0..self.states.len() {
            if !self.states[slot].shown {
                continue;
            }
            let kind = self.states[slot].kind;
            self.states[slot].trace_indices = if source.is_empty() {
                Vec::new()
            } else {
                self.attach(kind, source, surface)
            };
        }

        if DF.log_registry {
            log::debug!("reattach: {:?}", self.index_map());
        }
    }

    /// Enters or leaves multi-instrument mode. Entering hides every oscillator;
    /// returns the kinds that were hidden.
    pub fn set_multi_instrument<S: RenderSurface + ?Sized>(
        &mut self,
        multi: bool,
        surface: &mut S,
    ) -> Vec<IndicatorKind> {
        self.multi_instrument = multi;
        if !multi {
            return Vec::new();
        }

        let oscillators: Vec<IndicatorKind> = self
            .states
            .iter()
            .filter(|s| s.shown && s.is_oscillator)
            .map(|s| s.kind)
            .collect();
        for kind in &oscillators {
            self.hide(*kind, surface);
        }
        oscillators
    }

    /// Back to every kind hidden. Parameters survive.
    pub fn reset(&mut self) {
        for state in self.states.iter_mut() {
            state.shown = false;
            state.trace_indices.clear();
        }
    }

    fn attach<S: RenderSurface + ?Sized>(
        &self,
        kind: IndicatorKind,
        source: &IndicatorSource,
        surface: &mut S,
    ) -> Vec<usize> {
        let traces: Vec<Trace> = derive_lines(kind, &self.params(kind), &source.closes)
            .into_iter()
            .map(|line| {
                Trace::Line(LineTrace {
                    name: line.name,
                    dates: source.dates.clone(),
                    values: line.values,
                    axis: line.axis,
                    shape: LineShape::Linear,
                    color: line.color,
                    width: CHART_CONFIG.indicator_line_width,
                })
            })
            .collect();

        let added = traces.len();
        let count = surface.add_traces(traces);
        (count.saturating_sub(added)..count).collect()
    }

    fn index_map(&self) -> Vec<(IndicatorKind, Vec<usize>)> {
        self.states
            .iter()
            .filter(|s| !s.trace_indices.is_empty())
            .map(|s| (s.kind, s.trace_indices.clone()))
            .collect()
    }

    fn slot(kind: IndicatorKind) -> usize {
        IndicatorKind::iter().position(|k| k == kind).unwrap_or_default()
    }
}

/// Positions after removing `removed` (sorted ascending, positions before the removal).
/// Each index drops by the number of removed positions below it; removed positions
/// themselves are dropped.
pub fn shift_indices(indices: &[usize], removed: &[usize]) -> Vec<usize> {
    indices
        .iter()
        .filter(|idx| removed.binary_search(idx).is_err())
        .map(|&idx| idx - removed.partition_point(|&r| r < idx))
        .collect()
}

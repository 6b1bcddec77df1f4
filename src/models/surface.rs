use crate::models::traces::{ChartLayout, Trace};

/// The rendering collaborator. Trace positions are its only shared vocabulary
/// with the chart core: indices are positions in the current trace list.
pub trait RenderSurface {
    /// Replaces every trace and the layout.
    fn render(&mut self, traces: Vec<Trace>, layout: &ChartLayout);

    /// Appends traces, returning the trace count afterwards.
    fn add_traces(&mut self, traces: Vec<Trace>) -> usize;

    /// Removes the traces at `indices` (positions before the removal),
    /// returning the trace count afterwards.
    fn remove_traces(&mut self, indices: &[usize]) -> usize;

    fn relayout(&mut self, layout: &ChartLayout);

    fn trace_count(&self) -> usize;
}

/// In-memory surface that just keeps what it was given.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    pub traces: Vec<Trace>,
    pub layout: ChartLayout,
    pub render_calls: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trace_names(&self) -> Vec<&str> {
        self.traces.iter().map(Trace::name).collect()
    }

    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.traces.iter().position(|t| t.name() == name)
    }
}

impl RenderSurface for RecordingSurface {
    fn render(&mut self, traces: Vec<Trace>, layout: &ChartLayout) {
        self.traces = traces;
        self.layout = layout.clone();
        self.render_calls += 1;
    }

    fn add_traces(&mut self, traces: Vec<Trace>) -> usize {
        self.traces.extend(traces);
        self.traces.len()
    }

    fn remove_traces(&mut self, indices: &[usize]) -> usize {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        // Highest first so earlier positions stay valid
        for idx in sorted.into_iter().rev() {
            if idx < self.traces.len() {
                self.traces.remove(idx);
            }
        }
        self.traces.len()
    }

    fn relayout(&mut self, layout: &ChartLayout) {
        self.layout = layout.clone();
    }

    fn trace_count(&self) -> usize {
        self.traces.len()
    }
}

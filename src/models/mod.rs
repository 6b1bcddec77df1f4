pub mod cross_rate_graph;
pub mod currency_normalizer;
pub mod gap_interpolator;
pub mod indicator_registry;
pub mod indicators;
pub mod loaded_series;
pub mod ordered_series;
mod surface;
mod traces;

pub use cross_rate_graph::{CrossRateEdge, CrossRateGraph, EdgeDirection, OrientedEdge};
pub use currency_normalizer::{ConversionPath, CurrencyNormalizer, NormalizedSeries};
pub use indicator_registry::{
    IndicatorOverlayRegistry, IndicatorSource, IndicatorState, RefusalReason, ToggleOutcome,
};
pub use indicators::{IndicatorKind, IndicatorParams};
pub use loaded_series::LoadedInstrumentSeries;
pub use ordered_series::Location;
pub use surface::{RecordingSurface, RenderSurface};
pub use traces::{
    Axis, CandleColumns, CandlestickTrace, ChartLayout, LineShape, LineTrace, MarkerTrace,
    OhlcTrace, Trace,
};

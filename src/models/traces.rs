use serde::{Deserialize, Serialize};

use crate::config::Price;
use crate::domain::TransactionKind;

/// Which y axis / subplot a trace is drawn against.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Price,
    /// Secondary axis on the price subplot (holding quantity).
    Holding,
    /// Separate fixed-range subplot below the price chart.
    Oscillator,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineShape {
    #[default]
    Linear,
    /// Horizontal-then-vertical steps (holding curve).
    Step,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LineTrace {
    pub name: String,
    pub dates: Vec<String>,
    pub values: Vec<Option<Price>>,
    pub axis: Axis,
    pub shape: LineShape,
    pub color: &'static str,
    pub width: f32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CandleColumns {
    pub dates: Vec<String>,
    pub open: Vec<Option<Price>>,
    pub high: Vec<Option<Price>>,
    pub low: Vec<Option<Price>>,
    pub close: Vec<Option<Price>>,
}

impl CandleColumns {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CandlestickTrace {
    pub name: String,
    pub columns: CandleColumns,
    pub increasing_color: &'static str,
    pub decreasing_color: &'static str,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OhlcTrace {
    pub name: String,
    pub columns: CandleColumns,
    pub increasing_color: &'static str,
    pub decreasing_color: &'static str,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MarkerTrace {
    pub name: String,
    pub kind: TransactionKind,
    pub dates: Vec<String>,
    pub values: Vec<Price>,
    /// Hover text, one per marker.
    pub labels: Vec<String>,
    pub color: &'static str,
    pub size: f32,
}

/// One renderable series handed to the rendering surface.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum Trace {
    Line(LineTrace),
    Candlestick(CandlestickTrace),
    Ohlc(OhlcTrace),
    Marker(MarkerTrace),
}

impl Trace {
    pub fn name(&self) -> &str {
        match self {
            Trace::Line(t) => &t.name,
            Trace::Candlestick(t) => &t.name,
            Trace::Ohlc(t) => &t.name,
            Trace::Marker(t) => &t.name,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            Trace::Line(t) if t.shape == LineShape::Step => "step",
            Trace::Line(_) => "line",
            Trace::Candlestick(_) => "candlestick",
            Trace::Ohlc(_) => "ohlc",
            Trace::Marker(_) => "marker",
        }
    }

    pub fn axis(&self) -> Axis {
        match self {
            Trace::Line(t) => t.axis,
            Trace::Candlestick(_) | Trace::Ohlc(_) | Trace::Marker(_) => Axis::Price,
        }
    }

    pub fn point_count(&self) -> usize {
        match self {
            Trace::Line(t) => t.dates.len(),
            Trace::Candlestick(t) => t.columns.len(),
            Trace::Ohlc(t) => t.columns.len(),
            Trace::Marker(t) => t.dates.len(),
        }
    }
}

/// Layout descriptor handed to the surface alongside the traces.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ChartLayout {
    /// Reserve a fixed-range subplot for oscillator indicators.
    pub oscillator_subplot: bool,
    pub oscillator_range: (f64, f64),
    /// Fraction of the height the oscillator subplot takes.
    pub oscillator_domain_pct: f64,
    /// Secondary axis for the holding curve.
    pub holding_axis: bool,
    pub y_axis_title: String,
    /// User-drawn annotations, passed through to the surface untouched.
    #[serde(default)]
    pub shapes: Vec<serde_json::Value>,
}

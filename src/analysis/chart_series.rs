use crate::analysis::transactions::{holding_trace, marker_traces};
use crate::config::{ChartType, DisplayMode, constants::indicator, plot::CHART_CONFIG};
use crate::domain::OhlcPoint;
use crate::models::{
    Axis, CandleColumns, CandlestickTrace, ChartLayout, LineShape, LineTrace,
    LoadedInstrumentSeries, OhlcTrace, Trace,
};

/// Something the user should be told about instead of a chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartNotice {
    /// No price samples at all (or none in the window); instrument not drawn.
    NoData { instrument_id: String },
    /// Requested display currency unreachable; prices shown in `shown_currency`.
    Unconverted {
        instrument_id: String,
        requested: String,
        shown_currency: String,
    },
    /// Candles requested but no OHLC data; drawn as a line instead.
    OhlcUnavailable { instrument_id: String },
}

/// Base trace set plus layout, before indicators are attached.
#[derive(Debug, Clone, Default)]
pub struct BuiltChart {
    pub traces: Vec<Trace>,
    pub layout: ChartLayout,
    pub notices: Vec<ChartNotice>,
}

/// Turns the loaded instruments into plot-ready traces.
pub struct ChartSeriesBuilder<'a> {
    series: &'a [LoadedInstrumentSeries],
    chart_type: ChartType,
    mode: DisplayMode,
    requested_currency: &'a str,
}

impl<'a> ChartSeriesBuilder<'a> {
    pub fn new(series: &'a [LoadedInstrumentSeries]) -> Self {
        Self {
            series,
            chart_type: ChartType::default(),
            mode: DisplayMode::default(),
            requested_currency: "",
        }
    }

    pub fn chart_type(mut self, chart_type: ChartType) -> Self {
        self.chart_type = chart_type;
        self
    }

    pub fn mode(mut self, mode: DisplayMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn requested_currency(mut self, currency: &'a str) -> Self {
        self.requested_currency = currency;
        self
    }

    pub fn build(&self) -> BuiltChart {
        let mut chart = BuiltChart::default();

        let plottable: Vec<&LoadedInstrumentSeries> = self
            .series
            .iter()
            .filter(|s| {
                let empty = s.window().is_empty();
                if empty {
                    log::warn!("{}: no price data in the selected window", s.id());
                    chart.notices.push(ChartNotice::NoData {
                        instrument_id: s.id().to_string(),
                    });
                }
                !empty
            })
            .collect();
        let single = plottable.len() == 1;

        for (slot, series) in plottable.iter().enumerate() {
            if series.normalized.is_degraded() {
                chart.notices.push(ChartNotice::Unconverted {
                    instrument_id: series.id().to_string(),
                    requested: self.requested_currency.to_string(),
                    shown_currency: series.display_currency().to_string(),
                });
            }

            let label = &series.instrument.name;
            let candles = if single && self.chart_type.needs_ohlc() {
                let bars = series.display_ohlc().filter(|bars| !bars.is_empty());
                if bars.is_none() {
                    chart.notices.push(ChartNotice::OhlcUnavailable {
                        instrument_id: series.id().to_string(),
                    });
                }
                bars
            } else {
                None
            };

            match candles {
                Some(bars) => {
                    chart.traces.push(self.candle_trace(label, &bars));
                    chart.traces.extend(marker_traces(label, &bars, 1.0, &series.transactions));
                }
                None => {
                    chart.traces.push(self.line_trace(series, slot));
                    chart.traces.extend(marker_traces(
                        label,
                        series.window(),
                        series.factor.value(),
                        &series.transactions,
                    ));
                }
            }

            if single {
                let dates: Vec<&str> = series.window().iter().map(|p| p.date.as_str()).collect();
                if let Some(holding) = holding_trace(label, &dates, &series.transactions) {
                    chart.traces.push(holding);
                    chart.layout.holding_axis = true;
                }
            }
        }

        chart.layout.oscillator_range = indicator::OSCILLATOR_RANGE;
        chart.layout.oscillator_domain_pct = indicator::OSCILLATOR_DOMAIN_PCT;
        chart.layout.y_axis_title = match self.mode {
            DisplayMode::PercentFromStart => "%".to_string(),
            DisplayMode::Absolute => plottable
                .first()
                .map(|s| s.display_currency().to_string())
                .unwrap_or_default(),
        };
        chart
    }

    fn line_trace(&self, series: &LoadedInstrumentSeries, slot: usize) -> Trace {
        let window = series.window();
        Trace::Line(LineTrace {
            name: format!("{} ({})", series.instrument.name, series.display_currency()),
            dates: window.iter().map(|p| p.date.clone()).collect(),
            values: series.display_values(),
            axis: Axis::Price,
            shape: LineShape::Linear,
            color: CHART_CONFIG.instrument_colors[slot % CHART_CONFIG.instrument_colors.len()],
            width: CHART_CONFIG.price_line_width,
        })
    }

    fn candle_trace(&self, label: &str, bars: &[OhlcPoint]) -> Trace {
        let columns = CandleColumns {
            dates: bars.iter().map(|b| b.date.clone()).collect(),
            open: bars.iter().map(|b| b.open).collect(),
            high: bars.iter().map(|b| b.high).collect(),
            low: bars.iter().map(|b| b.low).collect(),
            close: bars.iter().map(|b| b.close).collect(),
        };
        let name = label.to_string();
        let (increasing_color, decreasing_color) =
            (CHART_CONFIG.candle_bullish_color, CHART_CONFIG.candle_bearish_color);

        match self.chart_type {
            ChartType::Ohlc => Trace::Ohlc(OhlcTrace {
                name,
                columns,
                increasing_color,
                decreasing_color,
            }),
            ChartType::Candlestick | ChartType::Line => Trace::Candlestick(CandlestickTrace {
                name,
                columns,
                increasing_color,
                decreasing_color,
            }),
        }
    }
}

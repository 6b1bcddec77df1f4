use crate::config::{DisplayFactor, DisplayMode, Price, constants::PERCENT_BASE};
use crate::domain::{DatedPoint, InstrumentInfo, OhlcPoint, Transaction};
use crate::models::currency_normalizer::{ConversionPath, CurrencyNormalizer, NormalizedSeries};
use crate::models::gap_interpolator::interpolate;
use crate::models::ordered_series::{find_exact, window_start};

/// Everything the chart holds for one plotted instrument.
#[derive(Debug, Clone)]
pub struct LoadedInstrumentSeries {
    pub instrument: InstrumentInfo,
    pub raw: Vec<DatedPoint>,
    pub ohlc: Option<Vec<OhlcPoint>>,
    pub transactions: Vec<Transaction>,
    pub normalized: NormalizedSeries,
    /// First visible index into `normalized.points`.
    pub window_start: usize,
    pub factor: DisplayFactor,
}

impl LoadedInstrumentSeries {
    pub fn new(
        instrument: InstrumentInfo,
        raw: Vec<DatedPoint>,
        ohlc: Option<Vec<OhlcPoint>>,
        transactions: Vec<Transaction>,
    ) -> Self {
        let normalized = NormalizedSeries {
            points: raw.clone(),
            currency: instrument.currency.clone(),
            path: ConversionPath::Identity,
        };
        Self {
            instrument,
            raw,
            ohlc: ohlc.filter(|bars| !bars.is_empty()),
            transactions,
            normalized,
            window_start: 0,
            factor: DisplayFactor::IDENTITY,
        }
    }

    pub fn id(&self) -> &str {
        &self.instrument.id
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn has_ohlc(&self) -> bool {
        self.ohlc.is_some()
    }

    pub fn first_date(&self) -> Option<&str> {
        self.raw.first().map(|p| p.date.as_str())
    }

    /// Currency the plotted values are in.
    pub fn display_currency(&self) -> &str {
        &self.normalized.currency
    }

    pub fn renormalize(&mut self, normalizer: &CurrencyNormalizer<'_>, display_ccy: &str) {
        self.normalized = normalizer.normalize(&self.raw, &self.instrument.currency, display_ccy);
    }

    /// Moves the visible window to start on or after `start_date` and
    /// recomputes the display factor for `mode`.
    pub fn set_window(&mut self, start_date: Option<&str>, mode: DisplayMode) {
        let points = &self.normalized.points;
        self.window_start = start_date.map_or(0, |date| window_start(points, date));

        self.factor = match mode {
            DisplayMode::Absolute => DisplayFactor::IDENTITY,
            DisplayMode::PercentFromStart if self.window_start < points.len() => {
                let start_value = interpolate(points, self.window_start);
                DisplayFactor::from_start_value(start_value, PERCENT_BASE).unwrap_or_else(|| {
                    log::warn!(
                        "{}: cannot rebase on start value {}; keeping absolute prices",
                        self.instrument.id,
                        start_value
                    );
                    DisplayFactor::IDENTITY
                })
            }
            DisplayMode::PercentFromStart => DisplayFactor::IDENTITY,
        };
    }

    /// Visible slice of the normalized series.
    pub fn window(&self) -> &[DatedPoint] {
        let start = self.window_start.min(self.normalized.points.len());
        &self.normalized.points[start..]
    }

    /// Visible values scaled by the display factor. Gaps stay `None`.
    pub fn display_values(&self) -> Vec<Option<Price>> {
        self.window()
            .iter()
            .map(|p| p.close.map(|v| self.factor.apply(v)))
            .collect()
    }

    /// Visible OHLC bars in display currency and scale. A bar is kept only when
    /// its date has both a raw and a normalized close to derive the ratio from.
    pub fn display_ohlc(&self) -> Option<Vec<OhlcPoint>> {
        let bars = self.ohlc.as_ref()?;
        let first_date = self.window().first()?.date.as_str();
        let start = window_start(bars, first_date);
        let converted = self.normalized.path != ConversionPath::Identity
            && self.normalized.path != ConversionPath::Unconverted;

        let out = bars[start..]
            .iter()
            .filter_map(|bar| {
                let ratio = if converted {
                    self.conversion_ratio(&bar.date)?
                } else {
                    1.0
                };
                Some(bar.rescaled(ratio * self.factor.value()))
            })
            .collect();
        Some(out)
    }

    fn conversion_ratio(&self, date: &str) -> Option<f64> {
        let raw = self.raw[find_exact(&self.raw, date)?].close?;
        let normalized = self.normalized.points[find_exact(&self.normalized.points, date)?].close?;
        if raw == 0.0 {
            return None;
        }
        Some(normalized / raw)
    }
}
